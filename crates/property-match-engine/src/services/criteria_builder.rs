use serde_json::Value;
use tracing::debug;

use crate::config::FieldMapping;
use crate::models::{CriteriaSet, Criterion, OR_SEPARATOR};
use crate::services::conversation::Preferences;
use crate::services::slots::{is_filled, SlotId};
use crate::utils::numeric::parse_leading_float;

/// Optional lower budget bound, set by callers rather than extracted
pub const MIN_BUDGET_KEY: &str = "minBudget";

/// Maps thread preferences onto listing fields.
pub struct CriteriaBuilder<'a> {
    fields: &'a FieldMapping,
}

impl<'a> CriteriaBuilder<'a> {
    pub fn new(fields: &'a FieldMapping) -> Self {
        Self { fields }
    }

    pub fn build(&self, preferences: &Preferences) -> CriteriaSet {
        let mut criteria = CriteriaSet::new();

        let max_budget = number(preferences, SlotId::Budget.as_str());
        let min_budget = number(preferences, MIN_BUDGET_KEY);
        if max_budget.is_some() || min_budget.is_some() {
            criteria.insert(&self.fields.price, Criterion::range(min_budget, max_budget));
        }

        if let Some(area) = text(preferences, SlotId::Area.as_str()) {
            criteria.insert(&self.fields.location, Criterion::contains(area));
        }

        if let Some(layout) = text(preferences, SlotId::Layout.as_str()) {
            criteria.insert(&self.fields.layout, Criterion::contains(layout));
        }

        if let Some(minutes) = number(preferences, SlotId::StationDistance.as_str()) {
            criteria.insert(&self.fields.station_distance, Criterion::at_most(minutes));
        }

        if let Some(size) = number(preferences, SlotId::Size.as_str()) {
            criteria.insert(&self.fields.floor_area, Criterion::at_least(size));
        }

        if let Some(features) = features(preferences) {
            criteria.insert(&self.fields.features, Criterion::contains(features));
        }

        debug!("Derived {} criteria from {} preferences", criteria.len(), preferences.len());
        criteria
    }
}

fn filled<'p>(preferences: &'p Preferences, key: &str) -> Option<&'p Value> {
    preferences.get(key).filter(|value| is_filled(value))
}

fn number(preferences: &Preferences, key: &str) -> Option<f64> {
    match filled(preferences, key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_leading_float(text),
        _ => None,
    }
}

fn text(preferences: &Preferences, key: &str) -> Option<String> {
    match filled(preferences, key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Feature list joined into one OR-separated needle
fn features(preferences: &Preferences) -> Option<String> {
    match filled(preferences, SlotId::Features.as_str())? {
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|item| !item.is_empty())
                .collect::<Vec<_>>()
                .join(&OR_SEPARATOR.to_string());
            (!joined.is_empty()).then_some(joined)
        }
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}
