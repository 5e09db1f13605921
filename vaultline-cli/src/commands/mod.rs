//! CLI command implementations

pub mod check;
pub mod login;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use thiserror::Error;
use vaultline_core::adapters::demo::DemoRecordStore;
use vaultline_core::config::Config;
use vaultline_core::{Credentials, VaultlineContext, ViewRenderer};

/// Endpoint recorded in demo mode when no settings file exists
const DEMO_ENDPOINT: &str = "https://demo.vaultline.invalid/users";

/// Options shared by every command
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub demo: bool,
}

/// Failure that the renderer has already shown to the user
#[derive(Debug, Error)]
#[error("sign-in failed")]
pub struct Reported;

/// Get the settings file path from arguments or default
pub fn get_settings_path(global: &GlobalArgs) -> PathBuf {
    if let Some(path) = &global.config {
        return path.clone();
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vaultline")
        .join("settings.json")
}

/// Load configuration for this invocation
pub fn load_config(global: &GlobalArgs) -> Result<Config> {
    let settings_path = get_settings_path(global);

    if global.demo {
        // Demo mode still honours poll interval and defaults when a file exists
        return Config::load_with_fallback_endpoint(&settings_path, DEMO_ENDPOINT)
            .with_context(|| format!("Failed to load configuration from {:?}", settings_path));
    }

    Config::load(&settings_path).with_context(|| {
        format!(
            "Failed to load configuration from {:?} (set endpointUrl there or in VAULTLINE_ENDPOINT_URL, or try --demo)",
            settings_path
        )
    })
}

/// Build the core context with the given renderer
pub fn get_context(
    global: &GlobalArgs,
    config: Config,
    renderer: Arc<dyn ViewRenderer>,
) -> Result<VaultlineContext> {
    if global.demo {
        return Ok(VaultlineContext::with_store(
            config,
            Arc::new(DemoRecordStore::new()),
            renderer,
        ));
    }

    VaultlineContext::new(config, renderer).context("Failed to initialize vaultline context")
}

/// Take credentials from arguments, prompting for anything missing
pub fn read_credentials(user: Option<String>, password: Option<String>) -> Result<Credentials> {
    let user = match user {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new().with_prompt("Password").interact()?,
    };
    Ok(Credentials::new(user, password))
}
