use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::catalog::{SlotId, AREA_GAZETTEER, FEATURE_KEYWORDS};

/// Amount in units of 10,000 yen: "10万円", "8.5万円"
static BUDGET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)万円").expect("budget pattern is valid"));

static AREA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("({})", AREA_GAZETTEER.join("|"))).expect("area pattern is valid")
});

static LAYOUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[1-4](?:LDK|DK|K)").expect("layout pattern is valid"));

/// "駅から5分", "駅から徒歩10分"
static STATION_DISTANCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"駅.?から[^0-9]{0,3}?([0-9]+).?分").expect("station distance pattern is valid")
});

/// "25㎡", "6畳", "30.5平米"; only the integer part is kept
static SIZE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+)(?:\.[0-9]+)?(?:畳|平米|㎡|m2|m²)").expect("size pattern is valid")
});

const BUDGET_UNIT: f64 = 10_000.0;

/// Values detected in one message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_distance: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl ExtractedValues {
    /// Detected slots in catalog order
    pub fn detected(&self) -> Vec<SlotId> {
        self.to_preferences()
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.detected().is_empty()
    }

    /// Slot id -> preference value, catalog order
    pub fn to_preferences(&self) -> Vec<(SlotId, Value)> {
        let mut values = Vec::new();
        if let Some(budget) = self.budget {
            values.push((SlotId::Budget, json!(budget)));
        }
        if let Some(area) = &self.area {
            values.push((SlotId::Area, json!(area)));
        }
        if let Some(layout) = &self.layout {
            values.push((SlotId::Layout, json!(layout)));
        }
        if let Some(distance) = self.station_distance {
            values.push((SlotId::StationDistance, json!(distance)));
        }
        if let Some(size) = self.size {
            values.push((SlotId::Size, json!(size)));
        }
        if !self.features.is_empty() {
            values.push((SlotId::Features, json!(self.features)));
        }
        values
    }
}

/// Pattern-based slot value extraction. Every rule runs independently and
/// the first match per slot wins.
pub struct SlotExtractor;

impl SlotExtractor {
    pub fn extract(message: &str) -> ExtractedValues {
        let values = ExtractedValues {
            budget: Self::budget(message),
            area: Self::area(message),
            layout: Self::layout(message),
            station_distance: Self::station_distance(message),
            size: Self::size(message),
            features: Self::features(message),
        };

        debug!(
            "Extracted slots {:?} from message ({} chars)",
            values.detected(),
            message.chars().count()
        );
        values
    }

    fn budget(message: &str) -> Option<i64> {
        let captures = BUDGET_PATTERN.captures(message)?;
        let amount: f64 = captures.get(1)?.as_str().parse().ok()?;
        Some((amount * BUDGET_UNIT).round() as i64)
    }

    fn area(message: &str) -> Option<String> {
        AREA_PATTERN
            .find(message)
            .map(|found| found.as_str().to_string())
    }

    fn layout(message: &str) -> Option<String> {
        LAYOUT_PATTERN
            .find(message)
            .map(|found| found.as_str().to_uppercase())
    }

    fn station_distance(message: &str) -> Option<i64> {
        let captures = STATION_DISTANCE_PATTERN.captures(message)?;
        captures.get(1)?.as_str().parse().ok()
    }

    fn size(message: &str) -> Option<i64> {
        let captures = SIZE_PATTERN.captures(message)?;
        captures.get(1)?.as_str().parse().ok()
    }

    fn features(message: &str) -> Vec<String> {
        FEATURE_KEYWORDS
            .iter()
            .filter(|keyword| message.contains(*keyword))
            .map(|keyword| keyword.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_and_layout() {
        let values = SlotExtractor::extract("予算は15万円、2LDKがいいです");
        assert_eq!(values.budget, Some(150000));
        assert_eq!(values.layout.as_deref(), Some("2LDK"));
        assert_eq!(values.detected(), vec![SlotId::Budget, SlotId::Layout]);
    }

    #[test]
    fn test_decimal_budget_is_rounded() {
        assert_eq!(SlotExtractor::extract("8.5万円まで").budget, Some(85000));
    }

    #[test]
    fn test_area_first_occurrence() {
        let values = SlotExtractor::extract("大阪か東京で探しています");
        assert_eq!(values.area.as_deref(), Some("大阪"));

        let values = SlotExtractor::extract("東京都内で");
        assert_eq!(values.area.as_deref(), Some("東京"));
    }

    #[test]
    fn test_layout_is_case_insensitive_and_uppercased() {
        assert_eq!(SlotExtractor::extract("1ldkか1dk").layout.as_deref(), Some("1LDK"));
        assert_eq!(SlotExtractor::extract("3DKで").layout.as_deref(), Some("3DK"));
        assert_eq!(SlotExtractor::extract("5LDK").layout, None);
    }

    #[test]
    fn test_station_distance_phrasings() {
        assert_eq!(SlotExtractor::extract("駅から5分以内").station_distance, Some(5));
        assert_eq!(SlotExtractor::extract("駅から徒歩10分").station_distance, Some(10));
        assert_eq!(SlotExtractor::extract("10分くらい").station_distance, None);
    }

    #[test]
    fn test_size_units() {
        assert_eq!(SlotExtractor::extract("25㎡以上").size, Some(25));
        assert_eq!(SlotExtractor::extract("8畳").size, Some(8));
        assert_eq!(SlotExtractor::extract("30.5平米").size, Some(30));
        assert_eq!(SlotExtractor::extract("40m2").size, Some(40));
    }

    #[test]
    fn test_features_in_catalog_order() {
        let values = SlotExtractor::extract("駐車場とペット可、南向きがいい");
        assert_eq!(values.features, vec!["ペット可", "駐車場", "南向き"]);
    }

    #[test]
    fn test_scenario_message() {
        let values = SlotExtractor::extract("東京で10万円以内の1Kを探しています");
        assert_eq!(values.budget, Some(100000));
        assert_eq!(values.area.as_deref(), Some("東京"));
        assert_eq!(values.layout.as_deref(), Some("1K"));
        assert_eq!(values.station_distance, None);
        assert_eq!(values.size, None);
        assert!(values.features.is_empty());
    }

    #[test]
    fn test_nothing_detected() {
        let values = SlotExtractor::extract("こんにちは");
        assert!(values.is_empty());
        assert_eq!(serde_json::to_value(&values).unwrap(), json!({}));
    }

    #[test]
    fn test_serializes_with_preference_keys() {
        let values = SlotExtractor::extract("駅から7分");
        assert_eq!(
            serde_json::to_value(&values).unwrap(),
            json!({"stationDistance": 7})
        );
    }
}
