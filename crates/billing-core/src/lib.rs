//! Shared types for the energy billing dashboard: invoice records, period
//! tokens, settings, time handling and display formatting.

pub mod error;
pub mod formatting;
pub mod models;
pub mod period;
pub mod settings;
pub mod time_utils;

pub use error::{BillingError, Result};
