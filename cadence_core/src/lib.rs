#![forbid(unsafe_code)]

//! Core domain model and analysis engine for the Cadence cycle tracker.
//!
//! This crate provides:
//! - Domain types (period records, cycle data, prediction and health output)
//! - Period record store with derived averages
//! - Shared cycle statistics
//! - Next-period prediction and ovulation phase checks
//! - Cycle health classification
//! - Fertile window estimation
//! - Cycle day and phase classification
//! - Persistence (locked JSON state with backup, CSV import/export)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod stats;
pub mod store;
pub mod state;
pub mod prediction;
pub mod health;
pub mod fertility;
pub mod phase;
pub mod csv_io;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::{CycleRepository, MemoryCycleStore};
pub use state::FileCycleStore;
pub use prediction::{is_ovulation_phase, predict_next_period};
pub use health::analyze_cycle_health;
pub use fertility::{classify_day, fertility_score, fertility_window};
pub use phase::current_phase;
pub use csv_io::{export_csv, import_csv};
pub use tracker::CycleTracker;
