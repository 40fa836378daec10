//! Instrument query building
//!
//! A listing is described by three typed parts:
//! - [`InstrumentFilter`]: AND-combined equality/substring conditions
//! - [`Sort`]: an allow-listed column and direction
//! - [`PageRequest`](crate::pagination::PageRequest): clamped page window
//!
//! The filter compiles to one [`InstrumentPredicate`], which appends the same
//! WHERE clause to both the COUNT query and the page query.

use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use crate::lookup::search_needle;
use crate::models::{Instrument, InstrumentStatus};

/// Filter options for instrument listings and exports
///
/// Every field is optional and conditions combine with AND. `archived`
/// defaults to `false`: listings show active instruments unless asked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentFilter {
    pub city_id: Option<i64>,
    pub category: Option<String>,
    pub status: Option<InstrumentStatus>,
    pub search: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl InstrumentFilter {
    pub fn city(mut self, city_id: i64) -> Self {
        self.city_id = Some(city_id);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn status(mut self, status: InstrumentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    /// Compile into the predicate shared by count and page queries
    pub fn predicate(&self) -> InstrumentPredicate {
        InstrumentPredicate {
            archived: self.archived,
            city_id: self.city_id,
            category: self.category.clone().filter(|c| !c.is_empty()),
            status: self.status,
            needle: self.search.as_deref().and_then(search_needle),
        }
    }
}

/// Normalized WHERE clause for the `instruments i` table alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentPredicate {
    archived: bool,
    city_id: Option<i64>,
    category: Option<String>,
    status: Option<InstrumentStatus>,
    needle: Option<String>,
}

impl InstrumentPredicate {
    /// Append ` WHERE ...` with bound parameters
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE i.archived = ").push_bind(self.archived);

        if let Some(city_id) = self.city_id {
            qb.push(" AND i.city_id = ").push_bind(city_id);
        }
        if let Some(category) = &self.category {
            qb.push(" AND i.category = ").push_bind(category.clone());
        }
        if let Some(status) = self.status {
            qb.push(" AND i.status = ").push_bind(status);
        }
        // instr() is a plain substring test: no LIKE wildcards, no ASCII-only folding
        if let Some(needle) = &self.needle {
            qb.push(" AND instr(i.lookup, ").push_bind(needle.clone()).push(") > 0");
        }
    }

    /// Whether an already loaded instrument satisfies this predicate
    pub fn matches(&self, instrument: &Instrument) -> bool {
        instrument.archived == self.archived
            && self.city_id.map_or(true, |id| instrument.city_id == id)
            && self
                .category
                .as_deref()
                .map_or(true, |c| instrument.category.as_deref() == Some(c))
            && self.status.map_or(true, |s| instrument.status == s)
            && self
                .needle
                .as_deref()
                .map_or(true, |n| instrument.lookup.contains(n))
    }
}

/// Allow-listed sort columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Id,
    Name,
    Quantity,
    ReceivedAt,
    CreatedAt,
}

impl SortField {
    /// Parse a requested column; anything outside the allow-list becomes `Id`
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "name" => SortField::Name,
            "quantity" => SortField::Quantity,
            "received_at" => SortField::ReceivedAt,
            "created_at" => SortField::CreatedAt,
            _ => SortField::Id,
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortField::Id => "i.id",
            SortField::Name => "i.name",
            SortField::Quantity => "i.quantity",
            SortField::ReceivedAt => "i.received_at",
            SortField::CreatedAt => "i.created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a requested direction; only `asc` (any case) is ascending
    pub fn parse_lenient(value: &str) -> Self {
        if value.eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sort specification, `id DESC` by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Build from raw request strings, falling back silently on unknown values
    pub fn parse_lenient(field: Option<&str>, order: Option<&str>) -> Self {
        Self {
            field: field.map(SortField::parse_lenient).unwrap_or_default(),
            order: order.map(SortOrder::parse_lenient).unwrap_or_default(),
        }
    }

    /// Append ` ORDER BY ...`; ties always break on ascending id
    pub fn push_order_by(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" ORDER BY ")
            .push(self.field.column())
            .push(" ")
            .push(self.order.keyword());
        if self.field != SortField::Id {
            qb.push(", i.id ASC");
        }
    }
}

/// One page of an instrument listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentPage {
    pub items: Vec<Instrument>,
    /// Matching records before pagination
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filter: &InstrumentFilter, sort: Sort) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT i.id FROM instruments i");
        filter.predicate().push_where(&mut qb);
        sort.push_order_by(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_default_filter_only_checks_archived() {
        let sql = sql_for(&InstrumentFilter::default(), Sort::default());
        assert_eq!(
            sql,
            "SELECT i.id FROM instruments i WHERE i.archived = ? ORDER BY i.id DESC"
        );
    }

    #[test]
    fn test_all_conditions_combine_with_and() {
        let filter = InstrumentFilter::default()
            .city(1)
            .category("Врачам")
            .status(InstrumentStatus::InTransit)
            .search("Скаль");
        let sql = sql_for(&filter, Sort::new(SortField::Name, SortOrder::Asc));
        assert_eq!(
            sql,
            "SELECT i.id FROM instruments i WHERE i.archived = ? AND i.city_id = ? \
             AND i.category = ? AND i.status = ? AND instr(i.lookup, ?) > 0 \
             ORDER BY i.name ASC, i.id ASC"
        );
    }

    #[test]
    fn test_empty_strings_are_not_conditions() {
        let filter = InstrumentFilter::default().category("").search("");
        assert_eq!(filter.predicate(), InstrumentFilter::default().predicate());
    }

    #[test]
    fn test_sort_field_fallback() {
        assert_eq!(SortField::parse_lenient("nonexistent"), SortField::Id);
        assert_eq!(SortField::parse_lenient("i.id; DROP TABLE x"), SortField::Id);
        assert_eq!(SortField::parse_lenient("received_at"), SortField::ReceivedAt);
    }

    #[test]
    fn test_sort_order_fallback() {
        assert_eq!(SortOrder::parse_lenient("sideways"), SortOrder::Desc);
        assert_eq!(SortOrder::parse_lenient("ASC"), SortOrder::Asc);
        assert_eq!(
            Sort::parse_lenient(Some("nonexistent"), Some("sideways")),
            Sort::parse_lenient(Some("id"), Some("desc"))
        );
        assert_eq!(Sort::parse_lenient(None, None), Sort::default());
    }
}
