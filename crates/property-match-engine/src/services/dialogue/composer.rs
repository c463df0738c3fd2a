use async_trait::async_trait;

use super::types::TurnOutcome;
use crate::config::FieldMapping;
use crate::models::{ChatMessage, Record};
use crate::utils::error::EngineResult;

pub const NO_MATCH_REPLY: &str = "条件に合う物件が見つかりませんでした。条件を変更して再度お試しください。";

const UNKNOWN: &str = "不明";
const NO_FEATURES: &str = "特になし";

/// Turns a turn outcome and the conversation so far into reply text.
/// Language-model backed implementations live outside this crate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplyComposer: Send + Sync {
    async fn compose(&self, outcome: &TurnOutcome, history: &[ChatMessage]) -> EngineResult<String>;
}

/// Deterministic composer: asks for the next slot when nothing matched,
/// otherwise lists the matched listings.
pub struct TemplateComposer {
    fields: FieldMapping,
    limit: usize,
}

impl TemplateComposer {
    pub fn new(fields: FieldMapping, limit: usize) -> Self {
        Self { fields, limit }
    }

    fn value_or(&self, record: &Record, field: &str, fallback: &str) -> String {
        record
            .get(field)
            .filter(|value| !value.is_blank())
            .map(|value| value.to_string())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn render_listing(&self, position: usize, record: &Record) -> String {
        let station = self
            .fields
            .stations
            .first()
            .map(|field| self.value_or(record, field, UNKNOWN))
            .unwrap_or_else(|| UNKNOWN.to_string());

        format!(
            "物件{}:\n所在地: {}\n賃料: {}\n間取り: {}\n面積: {}㎡\n最寄駅: {}\n特徴: {}",
            position,
            self.value_or(record, &self.fields.location, UNKNOWN),
            self.value_or(record, &self.fields.price, UNKNOWN),
            self.value_or(record, &self.fields.layout, UNKNOWN),
            self.value_or(record, &self.fields.floor_area, UNKNOWN),
            station,
            self.value_or(record, &self.fields.features, NO_FEATURES),
        )
    }

    pub fn render(&self, outcome: &TurnOutcome) -> String {
        if outcome.records.is_empty() {
            return match &outcome.next_prompt {
                Some(prompt) => prompt.clone(),
                None => NO_MATCH_REPLY.to_string(),
            };
        }

        outcome
            .records
            .iter()
            .take(self.limit)
            .enumerate()
            .map(|(i, record)| self.render_listing(i + 1, record))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl ReplyComposer for TemplateComposer {
    async fn compose(
        &self,
        outcome: &TurnOutcome,
        _history: &[ChatMessage],
    ) -> EngineResult<String> {
        Ok(self.render(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CriteriaSet;
    use crate::services::slots::{ExtractedValues, SLOT_CATALOG};

    fn outcome(records: Vec<Record>, next_prompt: Option<&str>) -> TurnOutcome {
        TurnOutcome {
            thread_id: "t".to_string(),
            extracted: ExtractedValues::default(),
            filled: Vec::new(),
            missing: Vec::new(),
            next_prompt: next_prompt.map(str::to_string),
            criteria: CriteriaSet::new(),
            records,
        }
    }

    fn composer() -> TemplateComposer {
        TemplateComposer::new(FieldMapping::default(), 3)
    }

    #[test]
    fn test_listing_block_with_fallbacks() {
        let record = Record::new()
            .with("所在地名称", "東京都新宿区")
            .with("賃料・価格", "85000")
            .with("間取り備考", "1K")
            .with("物件の特徴", "");
        assert_eq!(
            composer().render_listing(1, &record),
            "物件1:\n所在地: 東京都新宿区\n賃料: 85000\n間取り: 1K\n面積: 不明㎡\n最寄駅: 不明\n特徴: 特になし"
        );
    }

    #[test]
    fn test_no_records_asks_next_prompt() {
        let prompt = SLOT_CATALOG[3].prompt;
        assert_eq!(composer().render(&outcome(Vec::new(), Some(prompt))), prompt);
        assert_eq!(composer().render(&outcome(Vec::new(), None)), NO_MATCH_REPLY);
    }

    #[test]
    fn test_lists_at_most_limit_records() {
        let records = (0..5)
            .map(|i| Record::new().with("物件ID", i as i64))
            .collect();
        let text = composer().render(&outcome(records, None));
        assert!(text.contains("物件3:"));
        assert!(!text.contains("物件4:"));
    }

    #[tokio::test]
    async fn test_compose_is_render() {
        let composer = composer();
        let outcome = outcome(Vec::new(), None);
        let reply = composer.compose(&outcome, &[]).await.unwrap();
        assert_eq!(reply, NO_MATCH_REPLY);
    }
}
