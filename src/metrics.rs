/// Core per-match metrics derived from raw participant counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreMetrics {
    pub kda: f64,
    pub cs: i64,
    pub cs_per_min: f64,
}

/// Computes KDA, creep score and CS per minute.
///
/// Deaths are floored at 1 so a deathless game yields a finite ratio.
/// The caller must reject matches with `duration_secs == 0` before
/// reaching this function.
pub fn compute_core_metrics(
    kills: i64,
    assists: i64,
    deaths: i64,
    total_minions: i64,
    neutral_minions: i64,
    duration_secs: i64,
) -> CoreMetrics {
    let kda = (kills + assists) as f64 / deaths.max(1) as f64;
    let cs = total_minions + neutral_minions;
    let cs_per_min = cs as f64 / (duration_secs as f64 / 60.0);

    CoreMetrics {
        kda: round2(kda),
        cs,
        cs_per_min: round2(cs_per_min),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Kill-participation style fractions keep one more digit, matching the
// precision the match API itself reports.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
