// src/domain/query.rs
//
// Listing query value objects: filter criteria, ordering, pagination.
// Pure data; parsing from raw parameters lives in the service layer and
// SQL rendering lives in the repository.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Gallery columns a listing may filter or sort on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryField {
    Id,
    Name,
    Context,
    DefaultFormat,
    Enabled,
    CreatedAt,
    UpdatedAt,
}

impl GalleryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            GalleryField::Id => "id",
            GalleryField::Name => "name",
            GalleryField::Context => "context",
            GalleryField::DefaultFormat => "default_format",
            GalleryField::Enabled => "enabled",
            GalleryField::CreatedAt => "created_at",
            GalleryField::UpdatedAt => "updated_at",
        }
    }

    /// Timestamps are sortable but not filterable
    pub fn is_filterable(&self) -> bool {
        !matches!(self, GalleryField::CreatedAt | GalleryField::UpdatedAt)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            GalleryField::Id => FieldKind::Integer,
            GalleryField::Enabled => FieldKind::Bool,
            _ => FieldKind::Text,
        }
    }
}

impl FromStr for GalleryField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(GalleryField::Id),
            "name" => Ok(GalleryField::Name),
            "context" => Ok(GalleryField::Context),
            "default_format" | "defaultFormat" => Ok(GalleryField::DefaultFormat),
            "enabled" => Ok(GalleryField::Enabled),
            "created_at" | "createdAt" => Ok(GalleryField::CreatedAt),
            "updated_at" | "updatedAt" => Ok(GalleryField::UpdatedAt),
            other => Err(format!("Unknown gallery field '{}'", other)),
        }
    }
}

impl std::fmt::Display for GalleryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage type of a field, drives how raw filter values are coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Integer,
    Text,
}

/// Value side of one filter entry.
/// Scalars are equality filters, `AnyOf` is set membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    AnyOf(Vec<FilterValue>),
}

/// Field → filter mapping. Only non-null entries are ever stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryCriteria {
    filters: BTreeMap<GalleryField, FilterValue>,
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: GalleryField, value: FilterValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: GalleryField, value: FilterValue) {
        self.filters.insert(field, value);
    }

    pub fn get(&self, field: GalleryField) -> Option<&FilterValue> {
        self.filters.get(&field)
    }

    pub fn contains(&self, field: GalleryField) -> bool {
        self.filters.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GalleryField, &FilterValue)> {
        self.filters.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    /// Strict: only the exact tokens `ASC` and `DESC` are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            other => Err(format!("Invalid sort direction '{}'", other)),
        }
    }
}

/// Ordered (field, direction) pairs; earlier entries take precedence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingSpec {
    terms: Vec<(GalleryField, SortDirection)>,
}

impl OrderingSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, field: GalleryField, direction: SortDirection) -> Self {
        self.push(field, direction);
        self
    }

    /// Adds a sort term; a field already present keeps its first position
    pub fn push(&mut self, field: GalleryField, direction: SortDirection) {
        if !self.terms.iter().any(|(f, _)| *f == field) {
            self.terms.push((field, direction));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[(GalleryField, SortDirection)] {
        &self.terms
    }
}

/// Page window, 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Rows to skip. Page 0 is read as page 1.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parsing_accepts_both_spellings() {
        assert_eq!("default_format".parse::<GalleryField>(), Ok(GalleryField::DefaultFormat));
        assert_eq!("defaultFormat".parse::<GalleryField>(), Ok(GalleryField::DefaultFormat));
        assert!("password".parse::<GalleryField>().is_err());
    }

    #[test]
    fn test_sort_direction_is_strict() {
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert!("asc".parse::<SortDirection>().is_err());
        assert!("DOWN".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_ordering_ignores_repeated_field() {
        let ordering = OrderingSpec::new()
            .then(GalleryField::Name, SortDirection::Asc)
            .then(GalleryField::Name, SortDirection::Desc);

        assert_eq!(ordering.terms(), &[(GalleryField::Name, SortDirection::Asc)]);
    }

    #[test]
    fn test_offset_is_one_indexed() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 10).offset(), 20);
        assert_eq!(Pagination::new(0, 10).offset(), 0);
    }
}
