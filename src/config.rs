use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// A stalled, partially typed answer penalizes the expected token.
    Penalize,
    /// Timeouts are idle; keep waiting.
    Wait,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_question_length_limit")]
    pub question_length_limit: usize,
    #[serde(default = "default_penalty_capacity")]
    pub penalty_capacity: usize,
    #[serde(default = "default_penalty_probability")]
    pub penalty_probability: f64,
    #[serde(default = "default_sticky_probability")]
    pub sticky_probability: f64,
    #[serde(default = "default_short_token_len")]
    pub short_token_len: usize,
    #[serde(default = "default_short_token_weight")]
    pub short_token_weight: usize,
    #[serde(default = "default_long_token_weight")]
    pub long_token_weight: usize,
    #[serde(default = "default_timeout_weight")]
    pub timeout_weight: usize,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    #[serde(default = "default_timeout_policy")]
    pub timeout_policy: TimeoutPolicy,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_categories() -> Vec<String> {
    vec!["f-keys".to_string()]
}
fn default_question_length_limit() -> usize {
    75
}
fn default_penalty_capacity() -> usize {
    1024
}
fn default_penalty_probability() -> f64 {
    0.5
}
fn default_sticky_probability() -> f64 {
    0.2
}
fn default_short_token_len() -> usize {
    3
}
fn default_short_token_weight() -> usize {
    16
}
fn default_long_token_weight() -> usize {
    4
}
fn default_timeout_weight() -> usize {
    8
}
fn default_poll_timeout_secs() -> u64 {
    20
}
fn default_timeout_policy() -> TimeoutPolicy {
    TimeoutPolicy::Penalize
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            question_length_limit: default_question_length_limit(),
            penalty_capacity: default_penalty_capacity(),
            penalty_probability: default_penalty_probability(),
            sticky_probability: default_sticky_probability(),
            short_token_len: default_short_token_len(),
            short_token_weight: default_short_token_weight(),
            long_token_weight: default_long_token_weight(),
            timeout_weight: default_timeout_weight(),
            poll_timeout_secs: default_poll_timeout_secs(),
            timeout_policy: default_timeout_policy(),
            exclude: Vec::new(),
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keychenga")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Directory scanned for user drill files (`<name>.txt`).
    pub fn drills_dir() -> PathBuf {
        Self::config_dir().join("drills")
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs.max(1))
    }

    /// Clamp values a hand-edited file could push out of range.
    pub fn validate(&mut self) {
        if !(0.0..=1.0).contains(&self.penalty_probability) || self.penalty_probability.is_nan() {
            self.penalty_probability = default_penalty_probability();
        }
        if !(0.0..=1.0).contains(&self.sticky_probability) || self.sticky_probability.is_nan() {
            self.sticky_probability = default_sticky_probability();
        }
        self.question_length_limit = self.question_length_limit.max(10);
        self.penalty_capacity = self.penalty_capacity.max(1);
        let mut seen = HashSet::new();
        self.categories.retain(|name| seen.insert(name.clone()));
    }
}
