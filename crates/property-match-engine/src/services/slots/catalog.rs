use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Required pieces of information, in the order they are asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotId {
    Budget,
    Area,
    Layout,
    StationDistance,
    Size,
    Features,
}

impl SlotId {
    /// Preference key the slot is stored under
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotId::Budget => "budget",
            SlotId::Area => "area",
            SlotId::Layout => "layout",
            SlotId::StationDistance => "stationDistance",
            SlotId::Size => "size",
            SlotId::Features => "features",
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub id: SlotId,
    pub name: &'static str,
    pub prompt: &'static str,
}

pub const SLOT_CATALOG: [Slot; 6] = [
    Slot {
        id: SlotId::Budget,
        name: "予算",
        prompt: "予算はいくらぐらいをお考えですか？",
    },
    Slot {
        id: SlotId::Area,
        name: "エリア",
        prompt: "どのエリアをご希望ですか？",
    },
    Slot {
        id: SlotId::Layout,
        name: "間取り",
        prompt: "ご希望の間取りはありますか？",
    },
    Slot {
        id: SlotId::StationDistance,
        name: "駅からの距離",
        prompt: "駅からの距離はどのくらいが良いですか？",
    },
    Slot {
        id: SlotId::Size,
        name: "広さ",
        prompt: "お部屋の広さはどのくらいをご希望ですか？",
    },
    Slot {
        id: SlotId::Features,
        name: "特徴",
        prompt: "特に重視する条件（ペット可、オートロックなど）はありますか？",
    },
];

/// City names recognized as an area, matched at their first occurrence
pub const AREA_GAZETTEER: [&str; 15] = [
    "東京", "横浜", "大阪", "名古屋", "福岡", "札幌", "京都", "神戸", "さいたま", "千葉", "広島",
    "仙台", "川崎", "北九州", "堺",
];

/// Feature keywords, collected in this order when present in a message
pub const FEATURE_KEYWORDS: [&str; 10] = [
    "ペット可",
    "オートロック",
    "宅配ボックス",
    "駐車場",
    "バス・トイレ別",
    "エレベーター",
    "南向き",
    "角部屋",
    "2階以上",
    "インターネット無料",
];

/// Static answer options offered for a missing slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotSuggestion {
    pub options: &'static [&'static str],
    pub prompt: &'static str,
}

pub fn suggestion_for(id: SlotId) -> SlotSuggestion {
    match id {
        SlotId::Budget => SlotSuggestion {
            options: &["5万円以内", "10万円以内", "15万円以内", "20万円以内"],
            prompt: "予算はどのくらいをお考えですか？",
        },
        SlotId::Area => SlotSuggestion {
            options: &["東京", "大阪", "福岡", "横浜", "名古屋"],
            prompt: "お探しのエリアはどちらですか？",
        },
        SlotId::Layout => SlotSuggestion {
            options: &["1K", "1DK", "1LDK", "2LDK", "3LDK"],
            prompt: "ご希望の間取りはありますか？",
        },
        SlotId::StationDistance => SlotSuggestion {
            options: &["徒歩5分以内", "徒歩10分以内", "徒歩15分以内", "徒歩20分以内"],
            prompt: "駅からの距離はどのくらいが良いですか？",
        },
        SlotId::Size => SlotSuggestion {
            options: &["20㎡以上", "30㎡以上", "40㎡以上", "50㎡以上"],
            prompt: "お部屋の広さはどのくらいをご希望ですか？",
        },
        SlotId::Features => SlotSuggestion {
            options: &["ペット可", "オートロック", "駐車場", "バス・トイレ別", "南向き"],
            prompt: "特に重視する条件はありますか？",
        },
    }
}

/// Whether a stored preference value fills its slot.
///
/// null, `false`, "" and [] are unfilled. Numeric zero is filled.
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_order_and_keys() {
        let keys: Vec<_> = SLOT_CATALOG.iter().map(|slot| slot.id.as_str()).collect();
        assert_eq!(
            keys,
            vec!["budget", "area", "layout", "stationDistance", "size", "features"]
        );
        assert_eq!(
            serde_json::to_value(SlotId::StationDistance).unwrap(),
            json!("stationDistance")
        );
    }

    #[test]
    fn test_is_filled() {
        assert!(is_filled(&json!(0)));
        assert!(is_filled(&json!(150000)));
        assert!(is_filled(&json!("東京")));
        assert!(is_filled(&json!(["ペット可"])));
        assert!(is_filled(&json!(true)));
        assert!(!is_filled(&json!(null)));
        assert!(!is_filled(&json!(false)));
        assert!(!is_filled(&json!("")));
        assert!(!is_filled(&json!([])));
    }

    #[test]
    fn test_every_slot_has_suggestions() {
        for slot in SLOT_CATALOG {
            assert!(!suggestion_for(slot.id).options.is_empty());
        }
    }
}
