//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{FakeCatalog, scenario_catalog};
//!
//! #[test]
//! fn test_resolves() {
//!     let catalog = scenario_catalog();
//!     assert_eq!(catalog.calls().search, 0);
//! }
//! ```

mod constants;
mod fake_catalog;
mod fixtures;

// Public API - this is what tests import
pub use constants::*;
pub use fake_catalog::{CallCounts, FakeCatalog};
#[allow(unused_imports)]
pub use fixtures::{
    capture_logs, event, scenario_catalog, scenario_events, write_history_partition,
    write_library, TestDataDir,
};
