//! Interaction scripts
//!
//! A script is a TOML document with an optional `[config]` table and a list
//! of `[[step]]` entries. Targets are element ids.
//!
//! ```toml
//! [config]
//! debug = true
//!
//! [[step]]
//! action = "key"
//! target = "about-toggle"
//! key = "ArrowDown"
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use solo_dom::DOMRect;
use solo_menu::{Key, MenuConfig, MenuSystem, NodeId};

/// Parsed script
#[derive(Debug, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: MenuConfig,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One scripted interaction
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Click {
        target: String,
    },
    /// Key press; without a target it goes to the focused element
    Key {
        #[serde(default)]
        target: Option<String>,
        key: String,
        #[serde(default)]
        shift: bool,
    },
    PointerEnter {
        target: String,
    },
    PointerLeave {
        target: String,
    },
    Resize {
        width: u32,
    },
    Advance {
        ms: u64,
    },
    TransitionEnd {
        target: String,
    },
    /// Give an element a layout box
    Measure {
        target: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Validate,
}

impl Script {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let script: Self = toml::from_str(source).context("parsing script")?;
        script.config.validate().context("script [config]")?;
        Ok(script)
    }
}

fn element(system: &MenuSystem, id: &str) -> Result<NodeId> {
    system
        .document()
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("no element with id `{}`", id))
}

/// Run the steps in order against an attached system
pub fn run(system: &mut MenuSystem, steps: &[Step]) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        tracing::debug!("Step {}: {:?}", index + 1, step);
        apply(system, step).with_context(|| format!("step {}", index + 1))?;
    }
    Ok(())
}

fn apply(system: &mut MenuSystem, step: &Step) -> Result<()> {
    match step {
        Step::Click { target } => {
            let target = element(system, target)?;
            let response = system.click(target);
            tracing::info!("click -> {:?}", response);
        }
        Step::Key { target, key, shift } => {
            let key = Key::parse(key, *shift);
            let response = match target {
                Some(target) => {
                    let target = element(system, target)?;
                    system.key_down(target, key)
                }
                None => system.key_down_focused(key),
            };
            tracing::info!("key -> {:?}", response);
        }
        Step::PointerEnter { target } => {
            let target = element(system, target)?;
            system.pointer_enter(target);
        }
        Step::PointerLeave { target } => {
            let target = element(system, target)?;
            system.pointer_leave(target);
        }
        Step::Resize { width } => system.resize(*width),
        Step::Advance { ms } => system.advance(*ms),
        Step::TransitionEnd { target } => {
            let target = element(system, target)?;
            system.transition_end(target);
        }
        Step::Measure { target, x, y, width, height } => {
            let target = element(system, target)?;
            let data = system
                .context_mut()
                .doc
                .tree
                .element_mut(target)
                .ok_or_else(|| anyhow!("node {} is not an element", target))?;
            data.rect = Some(DOMRect::from_xywh(*x, *y, *width, *height));
        }
        Step::Validate => {
            let report = system.context_mut().validate_state();
            for message in report.messages() {
                tracing::warn!("{}", message);
            }
        }
    }
    Ok(())
}
