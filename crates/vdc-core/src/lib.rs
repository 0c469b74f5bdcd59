pub mod aggregation;
pub mod app_config;
pub mod config;
pub mod kpi;
pub mod products;
pub mod sheets;

pub use aggregation::{AggregationResult, CategoryFailure, CategoryOutcome};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use kpi::{CatalogKpis, CategoryCount, PriceBucket};
pub use products::{Category, CategoryRef, ProductRecord};
pub use sheets::{SheetProduct, SheetsEnvelope, UpdateState, UpdateStatus};
