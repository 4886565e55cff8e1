use crate::record::{StatsRecord, build_game_record};
use crate::riot_api::FetchError;
use serde_json::Value;

/// Operations the collection driver needs from the match backend.
///
/// `RiotClient` is the production implementation; tests drive the
/// pipeline with an in-memory stub.
pub trait MatchSource {
    fn list_match_ids(&self, puuid: &str, count: usize) -> Result<Vec<String>, FetchError>;
    fn fetch_match(&self, match_id: &str) -> Result<Value, FetchError>;
}

/// Result of a collection run: one record per successfully processed
/// match, in input order, plus how many identifiers were attempted.
pub struct Collection {
    pub records: Vec<StatsRecord>,
    pub attempted: usize,
}

/// Returns the participant entry whose `puuid` matches, if any.
///
/// An absent participant list or a non-matching one both mean "tracked
/// player not in this match"; neither is an error.
pub fn find_player_participant<'a>(info: &'a Value, puuid: &str) -> Option<&'a Value> {
    info.get("participants")?
        .as_array()?
        .iter()
        .find(|participant| {
            participant
                .get("puuid")
                .and_then(Value::as_str)
                .map(|value| value == puuid)
                .unwrap_or(false)
        })
}

/// Fetches and normalizes every match in `match_ids`, skipping the ones
/// that fail. A per-match failure never aborts the batch; pacing between
/// requests is handled by the source's own rate limiter.
pub fn collect_games<S: MatchSource>(source: &S, match_ids: &[String], puuid: &str) -> Collection {
    let total = match_ids.len();
    let mut records = Vec::with_capacity(total);

    for (index, match_id) in match_ids.iter().enumerate() {
        eprintln!("Processing match {}/{}: {}", index + 1, total, match_id);

        if let Some(record) = process_match(source, match_id, puuid) {
            records.push(record);
        }
    }

    Collection {
        records,
        attempted: total,
    }
}

fn process_match<S: MatchSource>(source: &S, match_id: &str, puuid: &str) -> Option<StatsRecord> {
    let match_json = match source.fetch_match(match_id) {
        Ok(json) => json,
        Err(err @ FetchError::RateLimited { .. }) => {
            eprintln!("  Rate limit exhausted for match {}: {}", match_id, err);
            return None;
        }
        Err(err) => {
            eprintln!("  Error fetching match {}: {}", match_id, err);
            return None;
        }
    };

    let Some(info) = match_json.get("info") else {
        eprintln!("  Warning: no 'info' in match data for {}", match_id);
        return None;
    };

    // Expected condition (player removed from replay, renamed, ...): skip
    // quietly rather than logging an error.
    let participant = find_player_participant(info, puuid)?;

    let duration = info
        .get("gameDuration")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    match build_game_record(participant, duration) {
        Ok(record) => Some(record),
        Err(err) => {
            eprintln!("  Error processing participant data for match {}: {}", match_id, err);
            None
        }
    }
}
