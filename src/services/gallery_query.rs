// src/services/gallery_query.rs
//
// Turns raw listing parameters into a typed ListRequest.
//
// `page`, `count` and `orderBy` are pulled out first; every other
// non-null entry becomes a filter criterion.

use regex::Regex;
use serde_json::Value;

use crate::config::AppConfig;
use crate::domain::{
    FieldKind, FilterValue, GalleryField, OrderingSpec, QueryCriteria, SortDirection,
    ValidationErrors,
};

/// Untyped query parameters as handed over by the transport layer
pub type RawParams = serde_json::Map<String, Value>;

pub const PAGE_PARAM: &str = "page";
pub const COUNT_PARAM: &str = "count";
pub const ORDER_BY_PARAM: &str = "orderBy";

pub const DEFAULT_PAGE: u32 = 1;

const DUPLICATE_FIELD: &str = "This field is given more than once under different names.";

/// A fully parsed listing query
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub criteria: QueryCriteria,
    pub ordering: OrderingSpec,
    pub page_size: u32,
    pub page: u32,
}

/// Parameter parsing rules: defaults plus the patterns raw values must match
pub struct ListRules {
    pub default_page_size: u32,
    pub max_page_size: Option<u32>,
    digits: Regex,
    flag: Regex,
}

impl Default for ListRules {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PAGE_SIZE, None)
    }
}

impl ListRules {
    pub fn new(default_page_size: u32, max_page_size: Option<u32>) -> Self {
        Self {
            default_page_size,
            max_page_size,
            digits: Regex::new(r"^\d+$").expect("static pattern"),
            flag: Regex::new(r"^(0|1)$").expect("static pattern"),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.default_page_size, config.max_page_size)
    }

    /// Parse raw parameters, collecting every problem before giving up
    pub fn parse(&self, params: &RawParams) -> Result<ListRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let page = self
            .parse_digits(PAGE_PARAM, params.get(PAGE_PARAM), &mut errors)
            .unwrap_or(DEFAULT_PAGE);

        let mut page_size = self
            .parse_digits(COUNT_PARAM, params.get(COUNT_PARAM), &mut errors)
            .unwrap_or(self.default_page_size);
        if let Some(max) = self.max_page_size {
            page_size = page_size.min(max);
        }

        let ordering = parse_ordering(params.get(ORDER_BY_PARAM), &mut errors);

        let mut criteria = QueryCriteria::new();
        for (key, value) in params {
            if matches!(key.as_str(), PAGE_PARAM | COUNT_PARAM | ORDER_BY_PARAM) {
                continue;
            }
            if value.is_null() {
                continue;
            }

            let field = match key.parse::<GalleryField>() {
                Ok(field) if field.is_filterable() => field,
                _ => {
                    errors.add(key.clone(), "This field cannot be used as a filter.");
                    continue;
                }
            };

            // `defaultFormat` and `default_format` name the same column
            if criteria.contains(field) {
                errors.add(key.clone(), DUPLICATE_FIELD);
                continue;
            }

            match self.coerce(field.kind(), value) {
                Ok(filter) => criteria.insert(field, filter),
                Err(message) => errors.add(key.clone(), message),
            }
        }

        errors.into_result()?;

        Ok(ListRequest {
            criteria,
            ordering,
            page_size,
            page,
        })
    }

    /// `None` when absent or null; records an error when the value is not `\d+`
    fn parse_digits(
        &self,
        name: &str,
        value: Option<&Value>,
        errors: &mut ValidationErrors,
    ) -> Option<u32> {
        let parsed = match value {
            None | Some(Value::Null) => return None,
            Some(Value::String(s)) if self.digits.is_match(s) => s.parse::<u32>().ok(),
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Some(_) => None,
        };

        if parsed.is_none() {
            errors.add(name, "This value should match \\d+.");
        }
        parsed
    }

    fn coerce(&self, kind: FieldKind, value: &Value) -> Result<FilterValue, String> {
        if let Value::Array(items) = value {
            let values = items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| self.coerce_scalar(kind, item))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(FilterValue::AnyOf(values));
        }
        self.coerce_scalar(kind, value)
    }

    fn coerce_scalar(&self, kind: FieldKind, value: &Value) -> Result<FilterValue, String> {
        match (kind, value) {
            (FieldKind::Bool, Value::Bool(b)) => Ok(FilterValue::Bool(*b)),
            (FieldKind::Bool, Value::String(s)) if self.flag.is_match(s) => {
                Ok(FilterValue::Bool(s == "1"))
            }
            (FieldKind::Bool, Value::Number(n)) if n.as_u64() == Some(0) || n.as_u64() == Some(1) => {
                Ok(FilterValue::Bool(n.as_u64() == Some(1)))
            }
            (FieldKind::Bool, _) => Err("This value should be 0 or 1.".to_string()),

            (FieldKind::Integer, Value::Number(n)) => n
                .as_i64()
                .map(FilterValue::Integer)
                .ok_or_else(|| "This value should be of type integer.".to_string()),
            (FieldKind::Integer, Value::String(s)) => s
                .parse::<i64>()
                .map(FilterValue::Integer)
                .map_err(|_| "This value should be of type integer.".to_string()),
            (FieldKind::Integer, _) => Err("This value should be of type integer.".to_string()),

            (FieldKind::Text, Value::String(s)) => Ok(FilterValue::Text(s.clone())),
            (FieldKind::Text, Value::Number(n)) => Ok(FilterValue::Text(n.to_string())),
            (FieldKind::Text, _) => Err("This value should be of type string.".to_string()),
        }
    }
}

fn parse_ordering(value: Option<&Value>, errors: &mut ValidationErrors) -> OrderingSpec {
    let mut ordering = OrderingSpec::new();

    let terms = match value {
        None | Some(Value::Null) => return ordering,
        Some(Value::Object(terms)) => terms,
        Some(_) => {
            errors.add(ORDER_BY_PARAM, "This value should be of type array.");
            return ordering;
        }
    };

    for (key, direction) in terms {
        let path = format!("{}[{}]", ORDER_BY_PARAM, key);

        let field = match key.parse::<GalleryField>() {
            Ok(field) => field,
            Err(_) => {
                errors.add(path, "This field cannot be used for ordering.");
                continue;
            }
        };

        if ordering.terms().iter().any(|(f, _)| *f == field) {
            errors.add(path, DUPLICATE_FIELD);
            continue;
        }

        match direction.as_str().map(str::parse::<SortDirection>) {
            Some(Ok(direction)) => ordering.push(field, direction),
            _ => errors.add(path, "This value should be ASC or DESC."),
        }
    }

    ordering
}
