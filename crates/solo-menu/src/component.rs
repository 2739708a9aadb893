//! Component identifiers and priority tiers

use serde::{Serialize, Serializer};

/// Priority tier for tabindex claims and operation preemption
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u8)]
pub enum PriorityTier {
    /// Passive components and unknown callers
    Default = 1,
    /// Mobile and sidebar menus (mutually exclusive by screen context)
    Context = 2,
    /// Keyboard-driven focus control
    FocusControl = 3,
}

impl PriorityTier {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Logical component that reads or writes menu state
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentId {
    Main,
    Mobile,
    Sidebar,
    Keyboard,
    Repositions,
    Scripts,
    /// Any other caller; gets the default tier
    Other(String),
}

impl ComponentId {
    /// Map a component name to its identifier
    pub fn from_name(name: &str) -> Self {
        match name {
            "main" => Self::Main,
            "mobile" => Self::Mobile,
            "sidebar" => Self::Sidebar,
            "keyboard" => Self::Keyboard,
            "repositions" => Self::Repositions,
            "scripts" => Self::Scripts,
            other => Self::Other(other.to_string()),
        }
    }

    /// Component name
    pub fn name(&self) -> &str {
        match self {
            Self::Main => "main",
            Self::Mobile => "mobile",
            Self::Sidebar => "sidebar",
            Self::Keyboard => "keyboard",
            Self::Repositions => "repositions",
            Self::Scripts => "scripts",
            Self::Other(name) => name,
        }
    }

    /// Priority tier; unknown components fall to the default tier
    pub fn priority(&self) -> PriorityTier {
        match self {
            Self::Keyboard => PriorityTier::FocusControl,
            Self::Mobile | Self::Sidebar => PriorityTier::Context,
            _ => PriorityTier::Default,
        }
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ComponentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Extra information recorded with a registration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentMetadata {
    /// Human-readable description
    pub description: String,
    /// Root element the component was attached to, by `id` attribute
    pub root: Option<String>,
}

impl ComponentMetadata {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            root: None,
        }
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = Some(root.to_string());
        self
    }
}
