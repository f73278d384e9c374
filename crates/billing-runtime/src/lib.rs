//! Runtime layer for the energy billing dashboard.
//!
//! Owns the asynchronous edges around the pure data layer: keeping a cached
//! snapshot of the invoice listing and serving invoice documents by file name.

pub mod data_manager;
pub mod downloads;

pub use billing_core as core;
pub use billing_data as data;
