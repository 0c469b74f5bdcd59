//! Normalization from source-specific shapes to [`vdc_core::ProductRecord`].

use vdc_core::{CategoryRef, ProductRecord, SheetProduct};

use crate::error::CatalogError;
use crate::types::GraphqlProduct;

/// Normalizes a GraphQL storefront item into a [`ProductRecord`].
///
/// # Errors
///
/// Returns [`CatalogError::Normalization`] if the item has no sku, no price
/// range, or a negative / non-finite price.
pub fn normalize_product(product: GraphqlProduct) -> Result<ProductRecord, CatalogError> {
    let sku = product
        .sku
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CatalogError::Normalization {
            sku: "<missing>".to_owned(),
            reason: "product has no sku".into(),
        })?;

    let Some(price_range) = product.price_range else {
        return Err(CatalogError::Normalization {
            sku,
            reason: "product has no price_range".into(),
        });
    };
    let minimum = price_range.minimum_price;
    let regular_price = validate_price(&sku, "regular", minimum.regular_price.value)?;
    let final_price = validate_price(&sku, "final", minimum.final_price.value)?;
    let currency = minimum
        .final_price
        .currency
        .or(minimum.regular_price.currency);

    let image_url = product
        .image
        .and_then(|i| i.url)
        .or_else(|| product.small_image.and_then(|i| i.url));

    let categories = product
        .categories
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| {
            let name = c.name.filter(|n| !n.is_empty())?;
            Some(CategoryRef {
                name,
                url_path: c.url_path,
                level: c.level,
            })
        })
        .collect();

    Ok(ProductRecord {
        name: product.name.unwrap_or_default(),
        is_salable: product.is_salable.unwrap_or(false),
        regular_price,
        final_price,
        currency,
        weight: product.weight.filter(|w| w.is_finite()),
        url_key: product.url_key.filter(|k| !k.is_empty()),
        image_url,
        categories,
        sku,
    })
}

/// Normalizes a spreadsheet row into a [`ProductRecord`].
///
/// The sheet has a single category column and no currency or image columns.
///
/// # Errors
///
/// Returns [`CatalogError::Normalization`] if the sku is blank or a price is
/// negative / non-finite.
pub fn normalize_sheet_row(row: SheetProduct) -> Result<ProductRecord, CatalogError> {
    let sku = row.sku.trim().to_owned();
    if sku.is_empty() {
        return Err(CatalogError::Normalization {
            sku: "<missing>".to_owned(),
            reason: "sheet row has no sku".into(),
        });
    }

    let regular_price = validate_price(&sku, "regular", Some(row.precio_regular))?;
    let final_price = validate_price(&sku, "final", Some(row.precio_final))?;

    let categories = row
        .categoria_nombre
        .filter(|c| !c.trim().is_empty())
        .map(|name| CategoryRef {
            name,
            url_path: None,
            level: None,
        })
        .into_iter()
        .collect();

    Ok(ProductRecord {
        sku,
        name: row.nombre,
        is_salable: row.existencia,
        regular_price,
        final_price,
        currency: None,
        weight: row.peso.filter(|w| w.is_finite()),
        url_key: None,
        image_url: None,
        categories,
    })
}

fn validate_price(sku: &str, label: &str, value: Option<f64>) -> Result<f64, CatalogError> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(CatalogError::Normalization {
            sku: sku.to_owned(),
            reason: format!("{label} price {v} is not a non-negative number"),
        }),
        None => Err(CatalogError::Normalization {
            sku: sku.to_owned(),
            reason: format!("{label} price is missing"),
        }),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
