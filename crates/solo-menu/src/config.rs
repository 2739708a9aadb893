//! Engine Configuration

use serde::{Deserialize, Serialize};

/// How submenus are revealed on large screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Hover,
    Click,
}

impl InteractionMode {
    /// Parse a `data-interaction` attribute value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hover" => Some(Self::Hover),
            "click" => Some(Self::Click),
            _ => None,
        }
    }
}

/// Breakpoint thresholds in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    /// Smallest width considered "medium"
    pub medium: u32,
    /// Smallest width considered "large"
    pub large: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            medium: 768,
            large: 1200,
        }
    }
}

/// Menu engine configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Verbose diagnostics: record conflicts and blocked claims, log issues
    pub debug: bool,

    /// Run the validator on a recurring interval
    pub diagnostics: bool,

    /// Interval for recurring validation (only with `diagnostics`)
    pub validation_interval_ms: u64,

    /// Age after which an in-flight operation is considered abandoned
    pub stale_operation_ms: u64,

    /// Time an operation slot stays held after the state was applied
    pub operation_grace_ms: u64,

    /// Debounce used by components that do not ask for their own
    pub default_debounce_ms: u64,

    /// Widths below this use the mobile menu
    pub mobile_breakpoint: u32,

    pub breakpoints: Breakpoints,

    /// Interaction mode when the navigation does not declare one
    pub interaction_mode: InteractionMode,

    /// Fallback timer for slide animations
    pub slide_duration_ms: u64,

    /// Conflict and blocked-claim logs keep at most this many entries
    pub conflict_log_capacity: usize,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            debug: false,
            diagnostics: false,
            validation_interval_ms: 10_000,
            stale_operation_ms: 5_000,
            operation_grace_ms: 50,
            default_debounce_ms: 150,
            mobile_breakpoint: 1200,
            breakpoints: Breakpoints::default(),
            interaction_mode: InteractionMode::Hover,
            slide_duration_ms: 300,
            conflict_log_capacity: 100,
        }
    }
}

impl MenuConfig {
    /// Verbose configuration used while developing a theme
    pub fn debug() -> Self {
        Self {
            debug: true,
            diagnostics: true,
            ..Self::default()
        }
    }

    /// Parse from TOML; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.breakpoints.medium >= self.breakpoints.large {
            return Err(ConfigError::Invalid(format!(
                "breakpoints.medium ({}) must be below breakpoints.large ({})",
                self.breakpoints.medium, self.breakpoints.large
            )));
        }
        if self.stale_operation_ms <= self.operation_grace_ms {
            return Err(ConfigError::Invalid(format!(
                "stale_operation_ms ({}) must exceed operation_grace_ms ({})",
                self.stale_operation_ms, self.operation_grace_ms
            )));
        }
        if self.diagnostics && self.validation_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "validation_interval_ms must be positive when diagnostics are on".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
