//! Catalog-driven field extraction.

use std::collections::BTreeMap;

use tracing::trace;

use super::catalog::{Catalog, Field};
use crate::models::institution::Institution;

/// Raw matched substrings keyed by field, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    values: BTreeMap<Field, String>,
}

impl RawFields {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

/// How one field was resolved against a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTrace {
    pub field: Field,
    /// Number of strategies the profile defines for the field.
    pub strategies: usize,
    /// Index of the first strategy that matched structurally.
    pub matched: Option<usize>,
    /// Value taken from the selected capture group.
    pub raw: Option<String>,
}

/// Applies one institution's catalog strategies to statement text.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor<'c> {
    catalog: &'c Catalog,
}

impl<'c> FieldExtractor<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Extract every field the institution's profile defines.
    ///
    /// For each field, strategies are tried in catalog order and the first
    /// structural match ends the search. Fields without strategies, and
    /// matches whose selected group is empty, are left out.
    pub fn extract(&self, text: &str, institution: Institution) -> RawFields {
        let mut raw = RawFields::default();
        for trace in self.trace(text, institution) {
            if let Some(value) = trace.raw {
                raw.insert(trace.field, value);
            }
        }
        raw
    }

    /// Per-field resolution details, in field order.
    pub fn trace(&self, text: &str, institution: Institution) -> Vec<FieldTrace> {
        Field::ALL
            .into_iter()
            .map(|field| self.resolve(text, institution, field))
            .collect()
    }

    fn resolve(&self, text: &str, institution: Institution, field: Field) -> FieldTrace {
        let strategies = self.catalog.lookup(institution, field);
        let mut trace = FieldTrace {
            field,
            strategies: strategies.len(),
            matched: None,
            raw: None,
        };

        for (index, strategy) in strategies.iter().enumerate() {
            if let Some(selected) = strategy.apply(text) {
                trace!("{}/{}: strategy #{} matched {:?}", institution, field, index, selected);
                trace.matched = Some(index);
                trace.raw = selected
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                break;
            }
        }

        trace
    }
}
