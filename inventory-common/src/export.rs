//! Flat export projection of instruments
//!
//! Pure read: rows are built from already loaded instruments and never feed
//! back into the store.

use serde::{Deserialize, Serialize};

use crate::models::Instrument;

/// Column titles, in row order
pub const EXPORT_COLUMNS: [&str; 8] = [
    "ID",
    "Город",
    "Наименование",
    "Категория",
    "Количество",
    "Дата поступления",
    "Состояние",
    "Примечание",
];

/// One exported instrument; absent optional values are empty strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub id: i64,
    pub city_name: String,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub received_at: String,
    pub status: String,
    pub note: String,
}

impl ExportRow {
    /// Cell values in [`EXPORT_COLUMNS`] order
    pub fn cells(&self) -> [String; 8] {
        [
            self.id.to_string(),
            self.city_name.clone(),
            self.name.clone(),
            self.category.clone(),
            self.quantity.to_string(),
            self.received_at.clone(),
            self.status.clone(),
            self.note.clone(),
        ]
    }
}

impl From<&Instrument> for ExportRow {
    fn from(instrument: &Instrument) -> Self {
        Self {
            id: instrument.id,
            city_name: instrument.city_name.clone(),
            name: instrument.name.clone(),
            category: instrument.category.clone().unwrap_or_default(),
            quantity: instrument.quantity,
            received_at: instrument
                .received_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            status: instrument.status.label().to_string(),
            note: instrument.note.clone().unwrap_or_default(),
        }
    }
}
