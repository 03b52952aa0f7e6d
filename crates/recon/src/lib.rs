//! `matdock-recon` — Matera ↔ Dock ledger reconciliation engine.
//!
//! Pure engine crate: receives pre-parsed tabular grids, returns the
//! classified result tables a workbook writer serializes. No file or
//! CLI dependencies. One call to [`run`] is one complete, isolated
//! reconciliation — it owns its inputs and derived tables and shares
//! no mutable state with concurrent runs.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod report;
pub mod summary;
pub mod xref;

pub use config::ReconConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{Grid, ReconInput, ReconResult, Table};
pub use report::SHEET_ORDER;
