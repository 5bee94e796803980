//! Catalog synchronization.
//!
//! ## Module Structure
//!
//! - `manager`: file inventory, translation store and the save projection
//! - `scheduler`: debounced, coalescing save requests on tokio

pub mod manager;
pub mod scheduler;


pub use manager::{CatalogManager, ExtractSummary, FileFailure, LoadSummary, ManagerState};
pub use scheduler::{SaveScheduler, SchedulerState};
