use crate::record::StatsRecord;
use anyhow::{Context, Result};
use csv::Writer;
use serde_json::Value;
use std::fs::{self, File};
use std::path::Path;

/// Writes the CSV and JSON exports next to each other, named after the
/// player label (`recent_games_{game}_{tag}.csv` / `.json`).
pub fn export_tabular_files(records: &[StatsRecord], out_dir: &Path, label: &str) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    let csv_path = out_dir.join(format!("recent_games_{}.csv", label));
    write_csv(records, &csv_path)?;

    let json_path = out_dir.join(format!("recent_games_{}.json", label));
    let file = File::create(&json_path)
        .with_context(|| format!("failed to create {}", json_path.display()))?;
    serde_json::to_writer_pretty(file, records)?;

    Ok(())
}

pub fn write_csv(records: &[StatsRecord], path: &Path) -> Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))?;

    // serialize() only emits the header row alongside the first record;
    // an empty run still gets the schema as a header-only file.
    if records.is_empty() {
        writer.write_record(StatsRecord::FIELD_NAMES)?;
    }

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the compact token-oriented export (`recent_games_{label}.txt`),
/// a denser rendition of the same rows for feeding to a language model.
pub fn export_toon_file(records: &[StatsRecord], out_dir: &Path, label: &str) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    let path = out_dir.join(format!("recent_games_{}.txt", label));
    let encoded = encode_toon(records)?;
    fs::write(&path, encoded).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

/// Encodes records as a tabular array: one header line declaring length
/// and field order, then one comma-joined row per record.
///
/// ```text
/// games[2]{champion,role,...}:
///   Ahri,SOLO,...
///   Jinx,CARRY,...
/// ```
pub fn encode_toon(records: &[StatsRecord]) -> Result<String> {
    if records.is_empty() {
        return Ok("games[0]:\n".to_string());
    }

    // Serialize through Value so row values come out in declaration order.
    let rows: Vec<Value> = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<_, _>>()?;

    let mut out = format!(
        "games[{}]{{{}}}:\n",
        records.len(),
        StatsRecord::FIELD_NAMES.join(",")
    );

    for row in &rows {
        let object = row
            .as_object()
            .context("record did not serialize to an object")?;
        let cells: Vec<String> = object.values().map(format_toon_value).collect();
        out.push_str("  ");
        out.push_str(&cells.join(","));
        out.push('\n');
    }

    Ok(out)
}

fn format_toon_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            // Bare strings only when they cannot be confused with the
            // row delimiters; otherwise fall back to a JSON string.
            if s.is_empty() || s.contains([',', '"', ':', '\n', '{', '}']) {
                serde_json::to_string(s).unwrap_or_default()
            } else {
                s.clone()
            }
        }
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
