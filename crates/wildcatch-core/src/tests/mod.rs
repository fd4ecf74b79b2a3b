//! Scenario tests that drive the whole service.
//!
//! - `determinism.rs`: same seed and inputs replay the same event log
//! - `integration.rs`: encounters, captures and arena upkeep end-to-end
//! - `helpers.rs`: species, records and a ready-made scene

pub mod helpers;
mod integration;
