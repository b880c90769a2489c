use serde::{Deserialize, Serialize};

/// How the selection engine settles equal scores.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Every tied candidate is equally likely.
    #[default]
    Uniform,
    /// Each tie replaces the incumbent with `tie_break_probability`.
    /// Favours candidates seen early in catalog order.
    Legacy,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PartyConfig {
    /// Number of recently played tracks excluded from selection.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// A member without a heartbeat for this long no longer counts.
    #[serde(default = "default_member_timeout_ms")]
    pub member_timeout_ms: u64,
    #[serde(default)]
    pub tie_break: TieBreak,
    #[serde(default = "default_tie_break_probability")]
    pub tie_break_probability: f64,
    /// Parties with no API activity for this long are dropped. 0 keeps them forever.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default = "default_eviction_interval_ms")]
    pub eviction_interval_ms: u64,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            history_len: default_history_len(),
            member_timeout_ms: default_member_timeout_ms(),
            tie_break: TieBreak::default(),
            tie_break_probability: default_tie_break_probability(),
            idle_timeout_ms: default_idle_timeout_ms(),
            eviction_interval_ms: default_eviction_interval_ms(),
        }
    }
}

fn default_history_len() -> usize {
    5
}

fn default_member_timeout_ms() -> u64 {
    15_000
}

fn default_tie_break_probability() -> f64 {
    0.1
}

fn default_idle_timeout_ms() -> u64 {
    6 * 60 * 60 * 1000
}

fn default_eviction_interval_ms() -> u64 {
    60_000
}
