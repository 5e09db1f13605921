//! Login command - sign in and show the account once

use std::sync::Arc;

use anyhow::Result;
use vaultline_core::{NullRenderer, ViewRenderer};

use super::{get_context, load_config, read_credentials, GlobalArgs, Reported};
use crate::renderer::TerminalRenderer;

pub async fn run(
    global: &GlobalArgs,
    user: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config(global)?;
    let credentials = read_credentials(user, password)?;

    // In JSON mode the record is printed here instead of by the renderer
    let renderer: Arc<dyn ViewRenderer> = if json {
        Arc::new(NullRenderer)
    } else {
        Arc::new(TerminalRenderer::default())
    };
    let ctx = get_context(global, config, renderer)?;

    let record = match ctx.session.attempt_login(&credentials).await {
        Ok(record) => record,
        Err(e) if json => return Err(e.into()),
        Err(_) => return Err(Reported.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }

    ctx.logout();
    Ok(())
}
