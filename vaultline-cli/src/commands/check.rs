//! Check command - show record store reachability

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use vaultline_core::NullRenderer;

use super::{get_context, load_config, GlobalArgs};
use crate::output;

pub async fn run(global: &GlobalArgs, json: bool) -> Result<()> {
    let config = load_config(global)?;
    let ctx = get_context(global, config, Arc::new(NullRenderer))?;
    let status = ctx.status_service.get_status().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        if !status.reachable {
            anyhow::bail!("Record store is unreachable");
        }
        return Ok(());
    }

    println!("{}", "Record Store Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Application", &format!("{} {}", ctx.config.app_name, ctx.config.version)]);
    table.add_row(vec!["Store", &status.store]);
    table.add_row(vec!["Endpoint", &ctx.config.endpoint_url]);
    table.add_row(vec!["Poll interval", &format!("{} ms", ctx.config.poll_interval_ms)]);
    table.add_row(vec!["Records", &status.total_records.to_string()]);

    println!("{}", table);
    println!();

    if let Some(error) = &status.error {
        anyhow::bail!("Record store is unreachable: {}", error);
    }

    if status.duplicate_identities > 0 {
        output::warning(&format!(
            "{} record(s) share a username with an earlier record and can never be signed in to",
            status.duplicate_identities
        ));
    }
    if status.records_without_secret > 0 {
        output::warning(&format!(
            "{} record(s) have no password and can never be signed in to",
            status.records_without_secret
        ));
    }

    output::success("Record store is reachable");
    Ok(())
}
