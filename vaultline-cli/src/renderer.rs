//! Terminal renderer - projects the held record onto stdout

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use vaultline_core::{Severity, UserRecord, ViewRenderer};

use crate::output;

/// How many recent transactions to show
const RECENT_TRANSACTIONS: usize = 10;

/// Renders records as a table and errors as colored lines
#[derive(Default)]
pub struct TerminalRenderer {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ViewRenderer for TerminalRenderer {
    fn render(&self, record: &UserRecord) {
        println!();
        println!("{}", format!("Welcome, {}", record.display_name).bold());

        let mut table = output::create_table();
        table.add_row(vec!["Account", record.account_type.as_str()]);
        table.add_row(vec![
            "Number".to_string(),
            output::mask_account_number(&record.account_number),
        ]);
        table.add_row(vec![
            "Balance".to_string(),
            output::format_money(record.balance, &record.currency),
        ]);
        table.add_row(vec!["Credit", record.credit.as_str()]);
        table.add_row(vec!["Status", record.status.as_str()]);
        println!("{}", table);

        if record.transactions.is_empty() {
            println!("{}", "No transactions yet".dimmed());
        } else {
            println!("{}", "Recent transactions".bold());
            for entry in record.transactions.iter().rev().take(RECENT_TRANSACTIONS) {
                println!("  - {}", entry);
            }
        }
    }

    fn show_error(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Blocking => output::error(message),
            Severity::Warning => output::warning(message),
        }
    }

    fn set_loading(&self, is_loading: bool) {
        let mut spinner = self.spinner.lock();

        if is_loading {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                bar.set_style(style);
            }
            bar.set_message("Contacting vault...");
            bar.enable_steady_tick(Duration::from_millis(100));
            *spinner = Some(bar);
        } else if let Some(bar) = spinner.take() {
            bar.finish_and_clear();
        }
    }
}
