//! Demo record store
//!
//! Serves a small fixed set of accounts whose balances drift on every fetch,
//! so the reconciliation loop has something to show without a real store:
//! - 3 users (`alice`, `bob`, `carol`), all with secret `demo`
//! - one new transaction on alice's account per fetch

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{RecordCollection, UserRecord};
use crate::ports::RecordStore;

/// Secret shared by every demo user
pub const DEMO_SECRET: &str = "demo";

/// Most transactions kept on alice's demo account
pub const DEMO_HISTORY_LIMIT: usize = 20;

/// Price of the `n`th demo coffee, in cents
fn coffee_cents(n: u64) -> i64 {
    325 + (n % 7) as i64 * 50
}

/// Total of the first `count` coffees, in cents
fn coffee_total_cents(count: u64) -> i64 {
    // Each run of seven coffees adds 0+1+...+6 = 21 steps of 50 cents
    let cycles = (count / 7) as i64;
    let rest = (count % 7) as i64;
    325 * count as i64 + 50 * (21 * cycles + rest * (rest + 1) / 2)
}

/// Generate the demo collection as it looks after `generation` fetches
///
/// Only the latest `DEMO_HISTORY_LIMIT` transactions are built, so the cost
/// of a fetch does not grow with the generation.
pub fn generate_demo_records(generation: u64) -> RecordCollection {
    let mut alice_history = vec![
        "Salary +3200.00".to_string(),
        "Rent -1450.00".to_string(),
        "Groceries -86.40".to_string(),
    ];
    let first_coffee = generation
        .saturating_sub(DEMO_HISTORY_LIMIT as u64)
        .max(1);
    for n in first_coffee..=generation {
        alice_history.push(format!("Coffee #{} -{}", n, Decimal::new(coffee_cents(n), 2)));
    }
    let excess = alice_history.len().saturating_sub(DEMO_HISTORY_LIMIT);
    alice_history.drain(..excess);

    // $4,823.47 before any coffee
    let alice_balance = Decimal::new(482347 - coffee_total_cents(generation), 2);

    vec![
        UserRecord::new("alice", DEMO_SECRET)
            .with_display_name("Alice Anders")
            .with_account_type("Checking")
            .with_account_number("VL-0001-4821")
            .with_balance(alice_balance, "USD")
            .with_credit("742")
            .with_transactions(alice_history),
        UserRecord::new("bob", DEMO_SECRET)
            .with_display_name("Bob Brennan")
            .with_account_type("Savings")
            .with_account_number("VL-0002-1177")
            .with_balance(Decimal::new(1875000, 2), "EUR")
            .with_transactions(["Interest +12.40", "Transfer in +500.00"]),
        // Left on fallback credit/status to show configured defaults
        UserRecord::new("carol", DEMO_SECRET)
            .with_display_name("Carol Chen")
            .with_balance(Decimal::new(-28476, 2), "GBP")
            .with_status("Frozen"),
    ]
}

/// Record store that serves the demo collection
#[derive(Debug, Default)]
pub struct DemoRecordStore {
    generation: AtomicU64,
}

impl DemoRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for DemoRecordStore {
    fn name(&self) -> &str {
        "demo"
    }

    async fn fetch_all(&self) -> Result<RecordCollection> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(generate_demo_records(generation))
    }
}
