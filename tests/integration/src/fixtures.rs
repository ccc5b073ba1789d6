//! Test fixtures and data generators
//!
//! Provides reusable identities, ids, and dates for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use tally_core::{FigureId, Identity, UserId};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Figure id unique across the test run, so a shared database stays usable
pub fn unique_figure_id(name: &str) -> FigureId {
    FigureId::parse(format!("{name}-{}", unique_suffix())).expect("valid figure id")
}

pub fn user_id(name: &str) -> UserId {
    UserId::parse(name).expect("valid user id")
}

/// Signed-in user without demographics
pub fn user(name: &str) -> Identity {
    Identity::new(user_id(name))
}

/// Signed-in user with a country and gender
pub fn user_from(name: &str, country: &str, gender: &str) -> Identity {
    Identity::new(user_id(name))
        .with_country(country)
        .with_gender(gender)
}

pub fn anonymous(name: &str) -> Identity {
    Identity::anonymous(user_id(name))
}

/// Parse an ISO calendar day
pub fn day(iso: &str) -> NaiveDate {
    iso.parse().expect("valid ISO date")
}
