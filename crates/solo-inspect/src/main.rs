//! Solo Inspect - run menu markup through the state engine
//!
//! Usage: `solo-inspect <markup.html> [script.toml]`
//!
//! Attaches the standard menu components, plays the script's steps and
//! prints the diagnostic report as JSON. Set `RUST_LOG=solo_menu=debug` to
//! watch conflicts and dropped operations as they happen.

mod script;

use anyhow::{Context, Result};
use solo_menu::MenuSystem;
use tracing_subscriber::EnvFilter;

use crate::script::Script;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(markup_path) = args.next() else {
        anyhow::bail!("usage: solo-inspect <markup.html> [script.toml]");
    };

    let markup = std::fs::read_to_string(&markup_path).with_context(|| format!("reading {}", markup_path))?;
    let doc = solo_html::parse(&markup).with_context(|| format!("parsing {}", markup_path))?;

    let script = match args.next() {
        Some(path) => {
            let source = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            Script::from_toml_str(&source).with_context(|| format!("loading {}", path))?
        }
        None => Script::default(),
    };

    let mut system = MenuSystem::with_default_components(doc, script.config.clone());
    system.attach();
    tracing::info!("Running {} step(s) against {}", script.steps.len(), markup_path);
    script::run(&mut system, &script.steps)?;

    println!("{}", system.diagnostics().to_json()?);
    Ok(())
}
