pub mod aggregate;
pub mod client;
pub mod error;
pub mod graphql;
pub mod normalize;
pub mod retry;
pub mod sheets;
pub mod types;

pub use aggregate::{aggregate_all, CatalogSource};
pub use client::{ClientOptions, HttpClient};
pub use error::CatalogError;
pub use graphql::{CategoryFetch, GraphqlClient};
pub use normalize::{normalize_product, normalize_sheet_row};
pub use retry::RetryPolicy;
pub use sheets::{parse_products_payload, SheetsAction, SheetsClient, SheetsParseError};
