//! Tax Engine library crate.
//!
//! This crate exposes the Guyana PAYE/NIS payroll calculator, the VAT
//! calculator, the client compliance scorer and the filing deadline
//! engine as reusable modules.  External applications may call into
//! them directly or embed the HTTP API via `api::build_router`.

pub mod api;
pub mod compliance;
pub mod config;
pub mod deadlines;
pub mod engine;
pub mod error;
pub mod holidays;
pub mod models;
pub mod money;
pub mod reports;
pub mod tax;
pub mod validation;
pub mod vat;

pub use error::{EngineError, Result};
