use super::*;
use crate::timer::DEFAULT_DONE_TIMEOUT_SECONDS;

pub(super) fn done_timeout_seconds() -> u64 {
    DEFAULT_DONE_TIMEOUT_SECONDS
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            idle: vec!["idle".to_string()],
            connected: vec!["connected".to_string(), "authorizing".to_string()],
            charging: vec!["charging".to_string()],
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            translation: TranslationConfig::default(),
            non_hours: Vec::new(),
            done_timeout_seconds: done_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/chargeguard.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            logging: LoggingConfig::default(),
            poll_interval_ms: 1000,
            timezone: "UTC".to_string(),
        }
    }
}
