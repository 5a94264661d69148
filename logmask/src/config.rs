//! Logger configuration.
//!
//! Precedence, lowest to highest:
//! 1. Programmatic defaults ([`Config::default`])
//! 2. `LOGMASK_*` environment variables, with `__` separating nested keys
//!    (`LOGMASK_MASKING__MODE=both`)
//!
//! Builder calls on [`crate::LoggerBuilder`] override both.

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use slog::Level;

use crate::{
    error::{Error, Result},
    mask::MaskingMode,
};

/// Environment variable prefix read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "LOGMASK_";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emitted as `application_name` on every record.
    pub service_name: String,
    /// Minimum level written.
    pub level: String,
    /// Records at or above this level carry a `stack_trace`.
    pub stacktrace_level: String,
    pub masking: MaskingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_owned(),
            level: "info".to_owned(),
            stacktrace_level: "error".to_owned(),
            masking: MaskingConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskingConfig {
    pub enabled: bool,
    pub mode: MaskingMode,
    /// Keep the domain of email addresses under partial masks.
    pub email_aware: bool,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: MaskingMode::TagDriven,
            email_aware: false,
        }
    }
}

impl Config {
    /// Defaults with `LOGMASK_*` environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    /// The figment [`Config::from_env`] extracts from. Merge further providers
    /// into it to layer other sources.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extracts and validates a configuration.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that both level names parse.
    pub fn validate(&self) -> Result<()> {
        parse_level(&self.level)?;
        parse_level(&self.stacktrace_level)?;
        Ok(())
    }
}

/// Parses a level name. Case-insensitive; `warning` and `critical` are
/// accepted as aliases.
pub fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::Trace),
        "debug" => Ok(Level::Debug),
        "info" => Ok(Level::Info),
        "warn" | "warning" => Ok(Level::Warning),
        "error" => Ok(Level::Error),
        "fatal" | "critical" => Ok(Level::Critical),
        _ => Err(Error::InvalidLevel(level.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use figment::{providers::Serialized, Figment};
    use slog::Level;

    use super::{parse_level, Config, MaskingConfig};
    use crate::{mask::MaskingMode, Error};

    #[test]
    fn parses_levels() {
        assert!(matches!(parse_level("trace"), Ok(Level::Trace)));
        assert!(matches!(parse_level("DEBUG"), Ok(Level::Debug)));
        assert!(matches!(parse_level("warning"), Ok(Level::Warning)));
        assert!(matches!(parse_level("fatal"), Ok(Level::Critical)));
        assert!(matches!(parse_level("loud"), Err(Error::InvalidLevel(level)) if level == "loud"));
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.level, "info");
        assert_eq!(config.stacktrace_level, "error");
        assert_eq!(config.masking, MaskingConfig::default());
        assert!(config.masking.enabled);
        assert_eq!(config.masking.mode, MaskingMode::TagDriven);
    }

    #[test]
    fn overrides_merge_over_defaults() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Serialized::default("service_name", "billing"))
            .merge(Serialized::default("masking.mode", "both"));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.service_name, "billing");
        assert_eq!(config.masking.mode, MaskingMode::Both);
        assert_eq!(config.level, "info");
        assert!(config.masking.enabled);
    }

    #[test]
    fn invalid_level_is_rejected() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Serialized::default("level", "loud"));
        assert!(matches!(
            Config::from_figment(figment),
            Err(Error::InvalidLevel(_))
        ));
    }

    #[test]
    fn unknown_mode_is_a_config_error() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Serialized::default("masking.mode", "sometimes"));
        assert!(matches!(Config::from_figment(figment), Err(Error::Config(_))));
    }
}
