//! Visit-schedule reconciliation.
//!
//! Computes how far each participant is into the trial and how many
//! collections of each instrument are missing at that point.

pub mod elapsed;
pub mod error;
pub mod expected;
pub mod reconcile;

pub use elapsed::{DAYS_PER_MONTH, elapsed_months, resolve_elapsed_months, today};
pub use error::{ReconcileError, Result};
pub use expected::expected_count;
pub use reconcile::{ReconcileOptions, UnknownInstrumentPolicy, reconcile, reconcile_records};
