//! `ReputationScore` and its scoring/decay/tier rules.

use serde::{Deserialize, Serialize};

pub const BASELINE: u8 = 50;
pub const SUCCESS_DELTA: i32 = 1;
pub const FAILURE_DELTA: i32 = -2;
pub const DEFAULT_DECAY_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_DECAY_RATE_PER_DAY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Exceptional,
    Trusted,
    Neutral,
    Cautionary,
    Untrusted,
}

pub fn tier_for(score: u8) -> Tier {
    match score {
        90..=100 => Tier::Exceptional,
        75..=89 => Tier::Trusted,
        50..=74 => Tier::Neutral,
        25..=49 => Tier::Cautionary,
        _ => Tier::Untrusted,
    }
}

/// Raw, persisted state for one identifier. `score` is the last
/// *committed* value; decay is applied transiently by [`Self::snapshot`]
/// and never writes back to this struct. Decay is a read-time rule, not
/// a mutating operation alongside
/// `record_success`/`record_failure`/`boost`/`slash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationScore {
    pub identifier: String,
    pub score: u8,
    pub total_actions: u64,
    pub successes: u64,
    pub last_action_at: i64,
}

impl ReputationScore {
    pub fn baseline(identifier: impl Into<String>, now: i64) -> Self {
        Self {
            identifier: identifier.into(),
            score: BASELINE,
            total_actions: 0,
            successes: 0,
            last_action_at: now,
        }
    }

    pub fn apply_delta(&mut self, delta: i32, now: i64) {
        let updated = self.score as i32 + delta;
        self.score = updated.clamp(0, 100) as u8;
        self.total_actions += 1;
        self.last_action_at = now;
    }

    /// Produces the read-time view: score after decay, tier, and success
    /// rate.
    pub fn snapshot(&self, now: i64, decay_window_days: i64, decay_rate_per_day: f64) -> ReputationSnapshot {
        let decayed = decayed_score(
            self.score,
            self.last_action_at,
            now,
            decay_window_days,
            decay_rate_per_day,
        );
        let success_rate = if self.total_actions == 0 {
            0.0
        } else {
            self.successes as f64 / self.total_actions as f64
        };
        ReputationSnapshot {
            identifier: self.identifier.clone(),
            score: decayed,
            tier: tier_for(decayed),
            total_actions: self.total_actions,
            success_rate,
            last_action_at: self.last_action_at,
        }
    }
}

/// Linear pull toward the baseline for every day past the inactivity
/// window, clamped so it never overshoots past 50.
fn decayed_score(
    score: u8,
    last_action_at: i64,
    now: i64,
    decay_window_days: i64,
    decay_rate_per_day: f64,
) -> u8 {
    let idle_seconds = now - last_action_at;
    let window_seconds = decay_window_days * 86_400;
    if idle_seconds <= window_seconds {
        return score;
    }
    let idle_days_past_window = (idle_seconds - window_seconds) as f64 / 86_400.0;
    let pull = idle_days_past_window * decay_rate_per_day;
    let score = score as f64;
    let baseline = BASELINE as f64;
    let decayed = if score > baseline {
        (score - pull).max(baseline)
    } else if score < baseline {
        (score + pull).min(baseline)
    } else {
        score
    };
    decayed.round().clamp(0.0, 100.0) as u8
}

/// The read-time view returned by `get_score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationSnapshot {
    pub identifier: String,
    pub score: u8,
    pub tier: Tier,
    pub total_actions: u64,
    pub success_rate: f64,
    pub last_action_at: i64,
}
