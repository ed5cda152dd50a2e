use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string() }
    }
}

/// Tunables for the dashboards and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Minimum completed/total ratio for a day to extend a streak
    pub streak_threshold: f64,
    pub ranking_window_days: u32,
    pub trend_window_days: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { streak_threshold: 0.8, ranking_window_days: 14, trend_window_days: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_config_default() {
        let config = GeneralConfig::default();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_progress_config_default() {
        let config = ProgressConfig::default();
        assert_eq!(config.streak_threshold, 0.8);
        assert_eq!(config.ranking_window_days, 14);
        assert_eq!(config.trend_window_days, 30);
    }
}
