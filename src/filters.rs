use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    forms::{FormField, apply_placeholders},
    listing::{FilterOutcome, FilterSet, QueryParams},
    models::Record,
};

/// FilterState
///
/// Echo of a record filter run: the submitted values, which of them narrowed the
/// collection, the ones rejected as malformed, and the form fields to redisplay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    pub data: BTreeMap<String, String>,
    pub applied: Vec<String>,
    pub errors: BTreeMap<String, String>,
    pub fields: Vec<FormField>,
}

/// RecordFilter
///
/// Filters for the record list:
/// - `name`: case-insensitive substring match.
/// - `category`: exact match.
/// - `active`: `true`/`1` keeps live records, `false`/`0` soft-deleted ones.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter;

impl RecordFilter {
    pub const FIELDS: [&'static str; 3] = ["name", "category", "active"];

    /// The filter form, pre-filled from `params`, with placeholders set.
    pub fn form_fields(params: &QueryParams) -> Vec<FormField> {
        let value = |name: &str| params.get(name).cloned().unwrap_or_default();
        let mut fields = vec![
            FormField::new("name", "Name", "text").with_value(value("name")),
            FormField::new("category", "Category", "text").with_value(value("category")),
            FormField::new("active", "Active", "select").with_value(value("active")),
        ];
        apply_placeholders(&mut fields);
        fields
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl FilterSet for RecordFilter {
    type Item = Record;
    type State = FilterState;

    fn apply(&self, params: &QueryParams, base: Vec<Record>) -> FilterOutcome<Record, FilterState> {
        let mut state = FilterState {
            fields: Self::form_fields(params),
            ..FilterState::default()
        };
        let mut items = base;

        for field in Self::FIELDS {
            let Some(raw) = params.get(field).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
                continue;
            };
            state.data.insert(field.to_string(), raw.to_string());

            match field {
                "name" => {
                    let needle = raw.to_lowercase();
                    items.retain(|record| record.name.to_lowercase().contains(&needle));
                }
                "category" => items.retain(|record| record.category == raw),
                "active" => match parse_flag(raw) {
                    Some(flag) => items.retain(|record| record.is_active() == flag),
                    None => {
                        state
                            .errors
                            .insert(field.to_string(), "Select a valid choice.".to_string());
                        continue;
                    }
                },
                _ => continue,
            }
            state.applied.push(field.to_string());
        }

        FilterOutcome { items, state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn records() -> Vec<Record> {
        let mut deleted = Record::new("Old Widget", "tools");
        deleted.mark_deleted(Uuid::from_u128(9));
        vec![
            Record::new("Widget", "tools"),
            Record::new("Gadget", "toys"),
            deleted,
        ]
    }

    #[test]
    fn filters_combine() {
        let outcome = RecordFilter.apply(
            &params(&[("name", "widget"), ("active", "true")]),
            records(),
        );
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].name, "Widget");
        assert_eq!(outcome.state.applied, vec!["name", "active"]);
    }

    #[test]
    fn malformed_flag_is_reported_not_applied() {
        let outcome = RecordFilter.apply(&params(&[("active", "maybe")]), records());
        assert_eq!(outcome.items.len(), 3);
        assert!(outcome.state.applied.is_empty());
        assert!(outcome.state.errors.contains_key("active"));
        assert_eq!(outcome.state.data.get("active").map(String::as_str), Some("maybe"));
    }

    #[test]
    fn form_fields_carry_values_and_placeholders() {
        let fields = RecordFilter::form_fields(&params(&[("category", "toys")]));
        let category = fields.iter().find(|f| f.name == "category").unwrap();
        assert_eq!(category.value, "toys");
        assert_eq!(
            category.attrs.get("placeholder").map(String::as_str),
            Some("Category")
        );
    }
}
