use crate::metrics::{compute_core_metrics, round2, round3};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Normalization failure for a single match. Distinguishable from
/// "player not in match" so the collection driver can log and skip
/// without aborting the batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("participant field `{0}` is missing")]
    MissingField(&'static str),
    #[error("game duration is zero")]
    ZeroDuration,
}

/// One player's flattened performance in one match.
///
/// The field set, field order and defaults are a fixed contract shared by
/// the CSV/JSON/TOON exporters and the coaching prompt; historical exports
/// stay comparable only as long as this schema is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub champion: String,
    pub role: String,
    pub lane: String,
    pub team_position: String,
    pub individual_position: String,
    pub win: bool,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub kda: f64,
    pub cs: i64,
    pub cs_per_min: f64,
    pub gold: i64,
    pub gold_spent: i64,
    pub damage_dealt: i64,
    pub damage_dealt_to_objectives: i64,
    pub damage_dealt_to_buildings: i64,
    pub physical_damage_dealt: i64,
    pub magic_damage_dealt: i64,
    pub true_damage_dealt: i64,
    pub physical_damage_to_champs: i64,
    pub magic_damage_to_champs: i64,
    pub true_damage_to_champs: i64,
    pub damage_taken: i64,
    pub physical_damage_taken: i64,
    pub magic_damage_taken: i64,
    pub true_damage_taken: i64,
    pub damage_self_mitigated: i64,
    pub total_heal: i64,
    pub total_heal_on_teammates: i64,
    pub damage_shielded_on_teammates: i64,
    pub total_cc_dealt: i64,
    pub total_time_cc_dealt: i64,
    pub vision_score: i64,
    pub wards_placed: i64,
    pub wards_killed: i64,
    pub sight_wards_bought: i64,
    pub vision_wards_bought: i64,
    pub detector_wards_placed: i64,
    pub pentakills: i64,
    pub quadrakills: i64,
    pub triplekills: i64,
    pub doublekills: i64,
    pub multikills: i64,
    pub dragon_kills: i64,
    pub baron_kills: i64,
    pub turret_kills: i64,
    pub turret_takedowns: i64,
    pub turrets_lost: i64,
    pub inhibitor_kills: i64,
    pub inhibitor_takedowns: i64,
    pub inhibitors_lost: i64,
    pub nexus_kills: i64,
    pub nexus_takedowns: i64,
    pub total_ally_jungle_minions: i64,
    pub total_enemy_jungle_minions: i64,
    pub true_mitigated_damage: i64,
    pub longest_time_alive: i64,
    pub total_time_dead: i64,
    pub killing_sprees: i64,
    pub largest_killing_spree: i64,
    pub first_blood_kill: bool,
    pub first_blood_assist: bool,
    pub first_tower_kill: bool,
    pub first_tower_assist: bool,
    pub champ_level: i64,
    pub champ_experience: i64,
    pub summoner1_id: i64,
    pub summoner2_id: i64,
    pub summoner1_casts: i64,
    pub summoner2_casts: i64,
    pub spell1_casts: i64,
    pub spell2_casts: i64,
    pub spell3_casts: i64,
    pub spell4_casts: i64,
    pub item0: i64,
    pub item1: i64,
    pub item2: i64,
    pub item3: i64,
    pub item4: i64,
    pub item5: i64,
    pub item6: i64,
    pub items_purchased: i64,
    pub consumables_purchased: i64,
    pub bounce_level: i64,
    pub unrealized_kills: i64,
    pub time_played: i64,
    pub game_ended_in_surrender: bool,
    pub game_ended_in_early_surrender: bool,
    pub team_early_surrendered: bool,
    pub gold_per_minute: f64,
    pub damage_per_minute: f64,
    pub vision_score_per_minute: f64,
    pub kill_participation: f64,
    pub kda_challenge: f64,
    pub largest_critical_strike: i64,
    pub damage_taken_on_team_percentage: f64,
    pub max_level_lead_lane_opponent: f64,
    pub max_cs_advantage_on_lane_opponent: f64,
    pub takedowns: i64,
    pub takedowns_first_25_minutes: i64,
    pub deaths_by_enemy_champs: i64,
    pub enemy_champ_immobilizations: i64,
    pub solo_kills: i64,
    pub outnumbered_kills: i64,
    pub game_duration: i64,
}

// The payload is loosely typed: counters sometimes arrive float-typed
// (e.g. challenge takedowns as 12.0), so integer reads tolerate either
// representation.
fn number_as_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

impl StatsRecord {
    /// Column names in wire order, for writers that must emit the schema
    /// even with zero records. Must stay in lockstep with the struct
    /// declaration; a test guards against drift.
    pub const FIELD_NAMES: [&'static str; 106] = [
        "champion",
        "role",
        "lane",
        "team_position",
        "individual_position",
        "win",
        "kills",
        "deaths",
        "assists",
        "kda",
        "cs",
        "cs_per_min",
        "gold",
        "gold_spent",
        "damage_dealt",
        "damage_dealt_to_objectives",
        "damage_dealt_to_buildings",
        "physical_damage_dealt",
        "magic_damage_dealt",
        "true_damage_dealt",
        "physical_damage_to_champs",
        "magic_damage_to_champs",
        "true_damage_to_champs",
        "damage_taken",
        "physical_damage_taken",
        "magic_damage_taken",
        "true_damage_taken",
        "damage_self_mitigated",
        "total_heal",
        "total_heal_on_teammates",
        "damage_shielded_on_teammates",
        "total_cc_dealt",
        "total_time_cc_dealt",
        "vision_score",
        "wards_placed",
        "wards_killed",
        "sight_wards_bought",
        "vision_wards_bought",
        "detector_wards_placed",
        "pentakills",
        "quadrakills",
        "triplekills",
        "doublekills",
        "multikills",
        "dragon_kills",
        "baron_kills",
        "turret_kills",
        "turret_takedowns",
        "turrets_lost",
        "inhibitor_kills",
        "inhibitor_takedowns",
        "inhibitors_lost",
        "nexus_kills",
        "nexus_takedowns",
        "total_ally_jungle_minions",
        "total_enemy_jungle_minions",
        "true_mitigated_damage",
        "longest_time_alive",
        "total_time_dead",
        "killing_sprees",
        "largest_killing_spree",
        "first_blood_kill",
        "first_blood_assist",
        "first_tower_kill",
        "first_tower_assist",
        "champ_level",
        "champ_experience",
        "summoner1_id",
        "summoner2_id",
        "summoner1_casts",
        "summoner2_casts",
        "spell1_casts",
        "spell2_casts",
        "spell3_casts",
        "spell4_casts",
        "item0",
        "item1",
        "item2",
        "item3",
        "item4",
        "item5",
        "item6",
        "items_purchased",
        "consumables_purchased",
        "bounce_level",
        "unrealized_kills",
        "time_played",
        "game_ended_in_surrender",
        "game_ended_in_early_surrender",
        "team_early_surrendered",
        "gold_per_minute",
        "damage_per_minute",
        "vision_score_per_minute",
        "kill_participation",
        "kda_challenge",
        "largest_critical_strike",
        "damage_taken_on_team_percentage",
        "max_level_lead_lane_opponent",
        "max_cs_advantage_on_lane_opponent",
        "takedowns",
        "takedowns_first_25_minutes",
        "deaths_by_enemy_champs",
        "enemy_champ_immobilizations",
        "solo_kills",
        "outnumbered_kills",
        "game_duration",
    ];
}

fn opt_i64(value: &Value, key: &str) -> i64 {
    value.get(key).and_then(number_as_i64).unwrap_or(0)
}

fn opt_f64(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn opt_bool(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn opt_str(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn req_i64(value: &Value, key: &'static str) -> Result<i64, NormalizeError> {
    value
        .get(key)
        .and_then(number_as_i64)
        .ok_or(NormalizeError::MissingField(key))
}

fn req_bool(value: &Value, key: &'static str) -> Result<bool, NormalizeError> {
    value
        .get(key)
        .and_then(Value::as_bool)
        .ok_or(NormalizeError::MissingField(key))
}

fn req_str(value: &Value, key: &'static str) -> Result<String, NormalizeError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .ok_or(NormalizeError::MissingField(key))
}

/// Flattens one raw participant object into a fully-defaulted `StatsRecord`.
///
/// Fields the match API documents as always present fail the whole record
/// when absent; every other field falls back to 0 / false / "" so the
/// output schema is total regardless of input shape.
pub fn build_game_record(
    participant: &Value,
    duration_secs: i64,
) -> Result<StatsRecord, NormalizeError> {
    if duration_secs <= 0 {
        return Err(NormalizeError::ZeroDuration);
    }

    let kills = req_i64(participant, "kills")?;
    let deaths = req_i64(participant, "deaths")?;
    let assists = req_i64(participant, "assists")?;
    let total_minions = req_i64(participant, "totalMinionsKilled")?;
    let neutral_minions = req_i64(participant, "neutralMinionsKilled")?;

    let metrics = compute_core_metrics(
        kills,
        assists,
        deaths,
        total_minions,
        neutral_minions,
        duration_secs,
    );

    // The challenges sub-object is optional as a whole; Value::Null makes
    // every lookup fall through to the field default.
    let challenges = participant.get("challenges").unwrap_or(&Value::Null);

    Ok(StatsRecord {
        champion: req_str(participant, "championName")?,
        role: req_str(participant, "role")?,
        lane: req_str(participant, "lane")?,
        team_position: opt_str(participant, "teamPosition"),
        individual_position: opt_str(participant, "individualPosition"),
        win: req_bool(participant, "win")?,
        kills,
        deaths,
        assists,
        kda: metrics.kda,
        cs: metrics.cs,
        cs_per_min: metrics.cs_per_min,
        gold: req_i64(participant, "goldEarned")?,
        gold_spent: opt_i64(participant, "goldSpent"),
        damage_dealt: req_i64(participant, "totalDamageDealtToChampions")?,
        damage_dealt_to_objectives: opt_i64(participant, "damageDealtToObjectives"),
        damage_dealt_to_buildings: opt_i64(participant, "damageDealtToBuildings"),
        physical_damage_dealt: opt_i64(participant, "physicalDamageDealt"),
        magic_damage_dealt: opt_i64(participant, "magicDamageDealt"),
        true_damage_dealt: opt_i64(participant, "trueDamageDealt"),
        physical_damage_to_champs: opt_i64(participant, "physicalDamageDealtToChampions"),
        magic_damage_to_champs: opt_i64(participant, "magicDamageDealtToChampions"),
        true_damage_to_champs: opt_i64(participant, "trueDamageDealtToChampions"),
        damage_taken: req_i64(participant, "totalDamageTaken")?,
        physical_damage_taken: opt_i64(participant, "physicalDamageTaken"),
        magic_damage_taken: opt_i64(participant, "magicDamageTaken"),
        true_damage_taken: opt_i64(participant, "trueDamageTaken"),
        damage_self_mitigated: opt_i64(participant, "damageSelfMitigated"),
        total_heal: req_i64(participant, "totalHeal")?,
        total_heal_on_teammates: opt_i64(participant, "totalHealsOnTeammates"),
        damage_shielded_on_teammates: opt_i64(participant, "totalDamageShieldedOnTeammates"),
        total_cc_dealt: opt_i64(participant, "timeCCingOthers"),
        total_time_cc_dealt: opt_i64(participant, "totalTimeCCDealt"),
        vision_score: req_i64(participant, "visionScore")?,
        wards_placed: req_i64(participant, "wardsPlaced")?,
        wards_killed: opt_i64(participant, "wardsKilled"),
        sight_wards_bought: opt_i64(participant, "sightWardsBoughtInGame"),
        vision_wards_bought: opt_i64(participant, "visionWardsBoughtInGame"),
        detector_wards_placed: opt_i64(participant, "detectorWardsPlaced"),
        pentakills: opt_i64(participant, "pentaKills"),
        quadrakills: opt_i64(participant, "quadraKills"),
        triplekills: opt_i64(participant, "tripleKills"),
        doublekills: opt_i64(participant, "doubleKills"),
        multikills: opt_i64(participant, "largestMultiKill"),
        dragon_kills: opt_i64(participant, "dragonKills"),
        baron_kills: opt_i64(participant, "baronKills"),
        turret_kills: opt_i64(participant, "turretKills"),
        turret_takedowns: opt_i64(participant, "turretTakedowns"),
        turrets_lost: opt_i64(participant, "turretsLost"),
        inhibitor_kills: opt_i64(participant, "inhibitorKills"),
        inhibitor_takedowns: opt_i64(participant, "inhibitorTakedowns"),
        inhibitors_lost: opt_i64(participant, "inhibitorsLost"),
        nexus_kills: opt_i64(participant, "nexusKills"),
        nexus_takedowns: opt_i64(participant, "nexusTakedowns"),
        total_ally_jungle_minions: opt_i64(participant, "totalAllyJungleMinionsKilled"),
        total_enemy_jungle_minions: opt_i64(participant, "totalEnemyJungleMinionsKilled"),
        true_mitigated_damage: opt_i64(participant, "damageSelfMitigated"),
        longest_time_alive: opt_i64(participant, "longestTimeSpentLiving"),
        total_time_dead: opt_i64(participant, "totalTimeSpentDead"),
        killing_sprees: opt_i64(participant, "killingSprees"),
        largest_killing_spree: opt_i64(participant, "largestKillingSpree"),
        first_blood_kill: opt_bool(participant, "firstBloodKill"),
        first_blood_assist: opt_bool(participant, "firstBloodAssist"),
        first_tower_kill: opt_bool(participant, "firstTowerKill"),
        first_tower_assist: opt_bool(participant, "firstTowerAssist"),
        champ_level: opt_i64(participant, "champLevel"),
        champ_experience: opt_i64(participant, "champExperience"),
        summoner1_id: opt_i64(participant, "summoner1Id"),
        summoner2_id: opt_i64(participant, "summoner2Id"),
        summoner1_casts: opt_i64(participant, "summoner1Casts"),
        summoner2_casts: opt_i64(participant, "summoner2Casts"),
        spell1_casts: opt_i64(participant, "spell1Casts"),
        spell2_casts: opt_i64(participant, "spell2Casts"),
        spell3_casts: opt_i64(participant, "spell3Casts"),
        spell4_casts: opt_i64(participant, "spell4Casts"),
        item0: opt_i64(participant, "item0"),
        item1: opt_i64(participant, "item1"),
        item2: opt_i64(participant, "item2"),
        item3: opt_i64(participant, "item3"),
        item4: opt_i64(participant, "item4"),
        item5: opt_i64(participant, "item5"),
        item6: opt_i64(participant, "item6"),
        items_purchased: opt_i64(participant, "itemsPurchased"),
        consumables_purchased: opt_i64(participant, "consumablesPurchased"),
        bounce_level: opt_i64(participant, "bountyLevel"),
        unrealized_kills: opt_i64(participant, "unrealKills"),
        time_played: opt_i64(participant, "timePlayed"),
        game_ended_in_surrender: opt_bool(participant, "gameEndedInSurrender"),
        game_ended_in_early_surrender: opt_bool(participant, "gameEndedInEarlySurrender"),
        team_early_surrendered: opt_bool(participant, "teamEarlySurrendered"),
        gold_per_minute: round2(opt_f64(challenges, "goldPerMinute")),
        damage_per_minute: round2(opt_f64(challenges, "damagePerMinute")),
        vision_score_per_minute: round2(opt_f64(challenges, "visionScorePerMinute")),
        kill_participation: round3(opt_f64(challenges, "killParticipation")),
        kda_challenge: round2(opt_f64(challenges, "kda")),
        largest_critical_strike: opt_i64(participant, "largestCriticalStrike"),
        damage_taken_on_team_percentage: round3(opt_f64(
            challenges,
            "damageTakenOnTeamPercentage",
        )),
        max_level_lead_lane_opponent: opt_f64(challenges, "maxLevelLeadLaneOpponent"),
        max_cs_advantage_on_lane_opponent: round2(opt_f64(
            challenges,
            "maxCsAdvantageOnLaneOpponent",
        )),
        takedowns: opt_i64(challenges, "takedowns"),
        takedowns_first_25_minutes: opt_i64(challenges, "takedownsFirst25Minutes"),
        deaths_by_enemy_champs: opt_i64(challenges, "deathsByEnemyChamps"),
        enemy_champ_immobilizations: opt_i64(challenges, "enemyChampionImmobilizations"),
        solo_kills: opt_i64(challenges, "soloKills"),
        outnumbered_kills: opt_i64(challenges, "outnumberedKills"),
        game_duration: duration_secs,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Participant carrying only the fields the match API guarantees.
    pub(crate) fn minimal_participant() -> Value {
        json!({
            "puuid": "puuid-1",
            "championName": "Ahri",
            "role": "SOLO",
            "lane": "MIDDLE",
            "win": true,
            "kills": 0,
            "deaths": 0,
            "assists": 0,
            "totalMinionsKilled": 0,
            "neutralMinionsKilled": 0,
            "goldEarned": 0,
            "totalDamageDealtToChampions": 0,
            "totalDamageTaken": 0,
            "totalHeal": 0,
            "visionScore": 0,
            "wardsPlaced": 0,
        })
    }

    #[test]
    fn optional_fields_default_to_zero_false_empty() {
        let record = build_game_record(&minimal_participant(), 1500).unwrap();

        assert_eq!(record.team_position, "");
        assert_eq!(record.individual_position, "");
        assert_eq!(record.gold_spent, 0);
        assert_eq!(record.damage_dealt_to_objectives, 0);
        assert_eq!(record.wards_killed, 0);
        assert_eq!(record.pentakills, 0);
        assert_eq!(record.turret_takedowns, 0);
        assert_eq!(record.total_ally_jungle_minions, 0);
        assert!(!record.first_blood_kill);
        assert!(!record.game_ended_in_surrender);
        assert!(!record.team_early_surrendered);
        assert_eq!(record.item0, 0);
        assert_eq!(record.item6, 0);
        assert_eq!(record.gold_per_minute, 0.0);
        assert_eq!(record.kill_participation, 0.0);
        assert_eq!(record.max_level_lead_lane_opponent, 0.0);
        assert_eq!(record.solo_kills, 0);
        assert_eq!(record.game_duration, 1500);
    }

    #[test]
    fn serialized_record_has_no_absent_fields() {
        let record = build_game_record(&minimal_participant(), 1500).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 106);
        assert!(object.values().all(|v| !v.is_null()));
    }

    #[test]
    fn field_names_match_serialized_order() {
        let record = build_game_record(&minimal_participant(), 1500).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(keys, StatsRecord::FIELD_NAMES);
    }

    #[test]
    fn derived_metrics_match_example_game() {
        let mut participant = minimal_participant();
        participant["kills"] = json!(10);
        participant["deaths"] = json!(2);
        participant["assists"] = json!(5);
        participant["totalMinionsKilled"] = json!(150);
        participant["neutralMinionsKilled"] = json!(20);

        let record = build_game_record(&participant, 1500).unwrap();
        assert_eq!(record.kda, 7.5);
        assert_eq!(record.cs, 170);
        assert_eq!(record.cs_per_min, 6.8);
        assert_eq!(record.champion, "Ahri");
    }

    #[test]
    fn item_slots_are_read_independently() {
        let mut participant = minimal_participant();
        participant["item0"] = json!(3089);
        participant["item3"] = json!(3020);
        participant["item6"] = json!(3364);

        let record = build_game_record(&participant, 900).unwrap();
        assert_eq!(record.item0, 3089);
        assert_eq!(record.item1, 0);
        assert_eq!(record.item2, 0);
        assert_eq!(record.item3, 3020);
        assert_eq!(record.item4, 0);
        assert_eq!(record.item5, 0);
        assert_eq!(record.item6, 3364);
    }

    #[test]
    fn challenge_fields_are_rounded_per_contract() {
        let mut participant = minimal_participant();
        participant["challenges"] = json!({
            "goldPerMinute": 401.23789,
            "damagePerMinute": 755.5555,
            "visionScorePerMinute": 1.23456,
            "killParticipation": 0.66666,
            "kda": 3.14159,
            "damageTakenOnTeamPercentage": 0.12345,
            "maxLevelLeadLaneOpponent": 2,
            "maxCsAdvantageOnLaneOpponent": 31.55555,
            "takedowns": 12,
            "soloKills": 3,
        });

        let record = build_game_record(&participant, 1200).unwrap();
        assert_eq!(record.gold_per_minute, 401.24);
        assert_eq!(record.damage_per_minute, 755.56);
        assert_eq!(record.vision_score_per_minute, 1.23);
        assert_eq!(record.kill_participation, 0.667);
        assert_eq!(record.kda_challenge, 3.14);
        assert_eq!(record.damage_taken_on_team_percentage, 0.123);
        assert_eq!(record.max_level_lead_lane_opponent, 2.0);
        assert_eq!(record.max_cs_advantage_on_lane_opponent, 31.56);
        assert_eq!(record.takedowns, 12);
        assert_eq!(record.solo_kills, 3);
    }

    #[test]
    fn float_typed_counters_are_accepted() {
        let mut participant = minimal_participant();
        participant["kills"] = json!(10.0);
        participant["deaths"] = json!(2.0);
        participant["assists"] = json!(5.0);
        participant["goldSpent"] = json!(11250.0);
        participant["challenges"] = json!({ "takedowns": 12.0 });

        let record = build_game_record(&participant, 1500).unwrap();
        assert_eq!(record.kills, 10);
        assert_eq!(record.deaths, 2);
        assert_eq!(record.assists, 5);
        assert_eq!(record.kda, 7.5);
        assert_eq!(record.gold_spent, 11250);
        assert_eq!(record.takedowns, 12);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let mut participant = minimal_participant();
        participant.as_object_mut().unwrap().remove("championName");

        let err = build_game_record(&participant, 1500).unwrap_err();
        assert_eq!(err, NormalizeError::MissingField("championName"));
    }

    #[test]
    fn zero_duration_is_rejected_before_derivation() {
        let err = build_game_record(&minimal_participant(), 0).unwrap_err();
        assert_eq!(err, NormalizeError::ZeroDuration);
    }
}
