//! Invoice data layer for the energy billing dashboard.
//!
//! Loads the invoice listing, derives chart points and running totals from
//! it, and filters it by client number and period. Every transform is a pure
//! function over an in-memory slice, re-run whenever the listing or the
//! criteria change.

pub mod aggregator;
pub mod filter;
pub mod reader;
pub mod report;

pub use billing_core as core;
