//! Inventory data model
//!
//! Row types read back from the store and the typed request payloads used to
//! create or modify them. Request payloads carry their own `validate()` so
//! transports and the store apply the same limits.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Maximum length of a city or category display name (characters)
pub const MAX_LABEL_NAME_LEN: usize = 100;

/// Maximum length of an instrument name (characters)
pub const MAX_INSTRUMENT_NAME_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// City joined with the number of instruments it owns (archived included)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CityWithCount {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub instruments_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Stock status of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum InstrumentStatus {
    #[default]
    Available,
    InTransit,
    OutOfStock,
}

impl InstrumentStatus {
    pub const ALL: [InstrumentStatus; 3] = [
        InstrumentStatus::Available,
        InstrumentStatus::InTransit,
        InstrumentStatus::OutOfStock,
    ];

    /// Wire/storage value
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentStatus::Available => "available",
            InstrumentStatus::InTransit => "in_transit",
            InstrumentStatus::OutOfStock => "out_of_stock",
        }
    }

    /// Human-readable label used in exports
    pub fn label(&self) -> &'static str {
        match self {
            InstrumentStatus::Available => "В наличии",
            InstrumentStatus::InTransit => "В пути",
            InstrumentStatus::OutOfStock => "Отсутствует",
        }
    }
}

impl std::fmt::Display for InstrumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InstrumentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        InstrumentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Status must be one of: available, in_transit, out_of_stock (got '{}')",
                    s
                ))
            })
    }
}

/// Instrument row joined with the owning city's display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Instrument {
    pub id: i64,
    pub city_id: i64,
    pub city_name: String,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i64,
    pub received_at: Option<NaiveDate>,
    pub status: InstrumentStatus,
    pub note: Option<String>,
    pub lookup: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an instrument, and for replacing its editable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentFields {
    pub city_id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, deserialize_with = "blank_date_as_none")]
    pub received_at: Option<NaiveDate>,
    #[serde(default)]
    pub status: InstrumentStatus,
    #[serde(default)]
    pub note: Option<String>,
}

impl InstrumentFields {
    /// Minimal payload with the documented defaults
    /// (quantity 0, status `available`, no category/date/note)
    pub fn new(city_id: i64, name: impl Into<String>) -> Self {
        Self {
            city_id,
            name: name.into(),
            category: None,
            quantity: 0,
            received_at: None,
            status: InstrumentStatus::default(),
            note: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_status(mut self, status: InstrumentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_received_at(mut self, date: NaiveDate) -> Self {
        self.received_at = Some(date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check limits and return the trimmed payload
    ///
    /// Optional text fields that are empty after trimming become `None`.
    pub fn validate(self) -> Result<Self> {
        if self.city_id <= 0 {
            return Err(Error::InvalidInput(
                "city_id must be a positive integer".to_string(),
            ));
        }

        let name = validate_name(&self.name, "Instrument name", MAX_INSTRUMENT_NAME_LEN)?;

        if self.quantity < 0 {
            return Err(Error::InvalidInput(
                "Quantity must be a non-negative integer".to_string(),
            ));
        }

        Ok(Self {
            name,
            category: trim_optional(self.category),
            note: trim_optional(self.note),
            ..self
        })
    }
}

/// `YYYY-MM-DD`, with null, `""` and whitespace all meaning "no date"
fn blank_date_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| de::Error::custom(format!("received_at '{}': {}", date, e))),
    }
}

/// Validate a city or category display name, returning it trimmed
pub fn validate_label_name(name: &str, what: &str) -> Result<String> {
    validate_name(name, what, MAX_LABEL_NAME_LEN)
}

fn validate_name(name: &str, what: &str, max_len: usize) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", what)));
    }
    if trimmed.chars().count() > max_len {
        return Err(Error::InvalidInput(format!(
            "{} cannot be longer than {} characters",
            what, max_len
        )));
    }
    Ok(trimmed.to_string())
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
