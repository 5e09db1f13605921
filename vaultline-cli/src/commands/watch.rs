//! Watch command - sign in and keep the account view current

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use super::{get_context, load_config, read_credentials, GlobalArgs, Reported};
use crate::output;
use crate::renderer::TerminalRenderer;

pub async fn run(
    global: &GlobalArgs,
    user: Option<String>,
    password: Option<String>,
    interval_ms: Option<u64>,
) -> Result<()> {
    let mut config = load_config(global)?;
    if let Some(ms) = interval_ms {
        config = config.with_poll_interval(Duration::from_millis(ms));
        config.validate()?;
    }
    let credentials = read_credentials(user, password)?;

    let ctx = get_context(global, config, Arc::new(TerminalRenderer::default()))?;

    // The renderer has already shown why the sign-in failed
    let (_record, handle) = ctx
        .login_and_watch(&credentials)
        .await
        .map_err(|_| Reported)?;
    output::info(&format!(
        "Watching for changes every {} s (Ctrl-C to stop)",
        ctx.config.poll_interval().as_secs_f64()
    ));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    handle.stop().await;
    ctx.logout();
    output::info("Signed out");
    Ok(())
}
