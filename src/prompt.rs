use crate::record::StatsRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const DEFAULT_MARKER: &str = "[DATA]";

pub fn read_prompt_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("prompt file not found: {}", path.display()))
}

/// Injects the serialized records into the template at `marker`. Templates
/// without the marker get the data appended after a blank line, so an
/// arbitrary prompt file still works.
pub fn build_prompt(records: &[StatsRecord], template: &str, marker: &str) -> Result<String> {
    let data_text = serde_json::to_string(records)?;

    if template.contains(marker) {
        Ok(template.replace(marker, &data_text))
    } else {
        Ok(format!("{}\n\n{}", template, data_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::build_game_record;
    use crate::record::tests::minimal_participant;

    fn records() -> Vec<StatsRecord> {
        vec![build_game_record(&minimal_participant(), 1500).unwrap()]
    }

    #[test]
    fn marker_is_replaced_in_place() {
        let prompt = build_prompt(&records(), "before [DATA] after", DEFAULT_MARKER).unwrap();
        assert!(prompt.starts_with("before [{"));
        assert!(prompt.ends_with(" after"));
        assert!(!prompt.contains("[DATA]"));
    }

    #[test]
    fn custom_marker_is_honored() {
        let template = "stats: [COPIER LES DONNEES CSV/JSON ICI]";
        let prompt = build_prompt(&records(), template, "[COPIER LES DONNEES CSV/JSON ICI]").unwrap();
        assert!(prompt.starts_with("stats: [{"));
    }

    #[test]
    fn missing_marker_appends_data() {
        let prompt = build_prompt(&records(), "analyze my games", DEFAULT_MARKER).unwrap();
        assert!(prompt.starts_with("analyze my games\n\n[{"));
    }

    #[test]
    fn injected_data_contains_schema_fields() {
        let prompt = build_prompt(&records(), "[DATA]", DEFAULT_MARKER).unwrap();
        assert!(prompt.contains("\"champion\":\"Ahri\""));
        assert!(prompt.contains("\"game_duration\":1500"));
    }
}
