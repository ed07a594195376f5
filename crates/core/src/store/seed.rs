//! Seed data for the customer store.
//!
//! The built-in sample set matches the records the web backoffice ships
//! with, so both surfaces show the same customers out of the box. A JSON
//! seed file (an array of customer objects in wire format) can replace it.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{Customer, CustomerId};

/// Errors loading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    /// The seed file is not a valid JSON array of customers.
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two seed records share an id.
    #[error("duplicate customer id in seed file: {0}")]
    DuplicateId(CustomerId),
}

/// The built-in sample customers.
#[must_use]
pub fn sample_customers() -> Vec<Customer> {
    // Dates are fixed, known-valid literals.
    #[allow(clippy::unwrap_used)]
    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    vec![
        Customer {
            id: CustomerId::new(1),
            name: "Youssef El Amrani".to_string(),
            email: Some("youssef.elamrani@example.com".to_string()),
            phone: "+212612345678".to_string(),
            points: 250,
            total_visits: 12,
            date_created: date(2024, 1, 15),
        },
        Customer {
            id: CustomerId::new(2),
            name: "Fatima Zahra Benali".to_string(),
            email: Some("fatima.benali@example.com".to_string()),
            phone: "+212623456789".to_string(),
            points: 180,
            total_visits: 8,
            date_created: date(2024, 2, 20),
        },
        Customer {
            id: CustomerId::new(3),
            name: "Omar Bouzid".to_string(),
            email: Some("omar.bouzid@example.com".to_string()),
            phone: "+212634567890".to_string(),
            points: 320,
            total_visits: 15,
            date_created: date(2024, 1, 10),
        },
    ]
}

/// Load and validate a JSON seed file.
///
/// # Errors
///
/// Returns [`SeedError`] if the file cannot be read or parsed, or if two
/// records share an id.
pub fn load_file(path: &Path) -> Result<Vec<Customer>, SeedError> {
    let contents = std::fs::read_to_string(path)?;
    parse(&contents)
}

/// Parse and validate seed JSON.
///
/// # Errors
///
/// Returns [`SeedError`] on malformed JSON or duplicate ids.
pub fn parse(json: &str) -> Result<Vec<Customer>, SeedError> {
    let customers: Vec<Customer> = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    for customer in &customers {
        if !seen.insert(customer.id) {
            return Err(SeedError::DuplicateId(customer.id));
        }
    }

    Ok(customers)
}
