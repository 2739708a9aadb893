//! Solo Menu State Engine
//!
//! Coordinates accessibility state for the Solo theme's menus.
//!
//! Features:
//! - Attribute ownership ledger (ARIA attributes and tabindex claims)
//! - Viewport/resize coordination with coalesced debouncing
//! - Per-menu operation slots with priority preemption
//! - Component registry and lifecycle trait
//! - Keyboard navigation state machine (roving tabindex)
//! - State validation and leak detection
//!
//! # Example
//! ```rust,ignore
//! use solo_menu::{MenuConfig, MenuSystem};
//!
//! let doc = solo_html::parse(markup)?;
//! let mut system = MenuSystem::with_default_components(doc, MenuConfig::default());
//! system.attach();
//! system.click(toggle);
//! system.advance(50);
//! println!("{}", system.diagnostics().to_json()?);
//! ```

pub mod animation;
pub mod component;
pub mod components;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod diagnostics;
pub mod keyboard;
pub mod ledger;
pub mod lifecycle;
pub mod registry;
pub mod scheduler;
pub mod system;
pub mod topology;
pub mod validator;
pub mod viewport;

mod error;

pub use animation::SlideDirection;
pub use component::{ComponentId, ComponentMetadata, PriorityTier};
pub use config::{Breakpoints, ConfigError, InteractionMode, MenuConfig};
pub use context::MenuContext;
pub use coordinator::{ActiveOperation, OperationKind, OperationOutcome};
pub use diagnostics::{DiagnosticReport, Diagnostics};
pub use error::MenuError;
pub use keyboard::{Key, KeyOutcome, NavPosition};
pub use ledger::{
    AttributeLedger, BlockedClaim, ConflictEvent, ConflictPolicy, OwnershipRecord, TabIndexClaim,
    WriteOutcome, CONFLICT_POLICY, STATE_CHANGE_EVENT,
};
pub use lifecycle::{EventResponse, Lifecycle, UiEvent};
pub use scheduler::{CancellationToken, Millis, Scheduler, TimerId, TimerTask};
pub use system::MenuSystem;
pub use validator::{ValidationIssue, ValidationReport};
pub use viewport::{Breakpoint, ObservationMode, ResizeCallback, ScreenSizeSnapshot};

pub use solo_dom::{Document, NodeId};
