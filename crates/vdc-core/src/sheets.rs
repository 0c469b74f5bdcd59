//! Types exchanged with the spreadsheet-backed catalog source.
//!
//! Field names follow the sheet's own column headers, which are Spanish.

use serde::{de, Deserialize, Deserializer, Serialize};

/// One row of the product sheet.
///
/// Cells come from Apps Script as typed JSON, so a blank cell is `""` and a
/// numeric sku is a number. Every column accepts those forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetProduct {
    #[serde(deserialize_with = "text_cell")]
    pub sku: String,
    #[serde(default, deserialize_with = "text_cell")]
    pub nombre: String,
    /// In stock.
    #[serde(default, deserialize_with = "flag_cell")]
    pub existencia: bool,
    #[serde(default, deserialize_with = "price_cell")]
    pub precio_regular: f64,
    #[serde(default, deserialize_with = "price_cell")]
    pub precio_final: f64,
    #[serde(default, deserialize_with = "number_cell")]
    pub peso: Option<f64>,
    #[serde(default, deserialize_with = "optional_text_cell")]
    pub categoria_nombre: Option<String>,
}

/// Any scalar a sheet cell can hold.
#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    fn into_text(self) -> String {
        match self {
            Cell::Bool(b) => b.to_string(),
            Cell::Int(n) => n.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s,
        }
    }
}

fn text_cell<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Cell>::deserialize(deserializer)?
        .map(Cell::into_text)
        .unwrap_or_default())
}

fn optional_text_cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Cell>::deserialize(deserializer)?
        .map(Cell::into_text)
        .filter(|s| !s.trim().is_empty()))
}

/// Number, numeric text (thousands separators allowed), blank, or null.
#[allow(clippy::cast_precision_loss)]
fn number_cell<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Cell>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Cell::Int(n)) => Ok(Some(n as f64)),
        Some(Cell::Float(f)) => Ok(Some(f)),
        Some(Cell::Text(s)) => {
            let cleaned = s.trim().replace(',', "");
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
                .parse::<f64>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("\"{s}\" is not a number")))
        }
        Some(Cell::Bool(b)) => Err(de::Error::custom(format!("{b} is not a number"))),
    }
}

fn price_cell<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_cell(deserializer)?.unwrap_or(0.0))
}

fn flag_cell<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Cell>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Cell::Bool(b)) => Ok(b),
        Some(Cell::Int(n)) => Ok(n != 0),
        Some(Cell::Float(f)) => Ok(f.abs() > f64::EPSILON),
        Some(Cell::Text(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "si" | "sí" | "1" => Ok(true),
            "false" | "no" | "0" | "" => Ok(false),
            _ => Err(de::Error::custom(format!("\"{s}\" is not a yes/no value"))),
        },
    }
}

/// The `{success, data, message}` envelope the sheet endpoint answers with.
///
/// Some deployments answer with a bare array instead; the catalog crate's
/// parser lifts that into this shape with `success = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetsEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<SheetProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateState {
    Idle,
    Running,
}

/// Progress of a sheet refresh triggered by `run_manual_update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub status: UpdateState,
    /// Percentage, 0 to 100.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub message: String,
    /// Summary produced when the last refresh finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

impl UpdateStatus {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == UpdateState::Running
    }
}
