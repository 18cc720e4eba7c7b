// --- File: crates/studify_dispatch/src/lib.rs ---
// Declare modules within this crate
pub mod broadcast;
pub mod cleanup;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod routes;
pub mod scan;
#[cfg(test)]
mod scan_test;
pub mod scheduler;
#[cfg(test)]
pub(crate) mod testutil;

pub mod diagnostics;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
pub use broadcast::{BroadcastOutcome, BroadcastRequest};
pub use cleanup::CleanupJob;
pub use error::DispatchError;
pub use gateway::{build_gateway, DispatchGateway, SqlDispatchGateway};
pub use scan::ScanOutcome;
pub use scheduler::JobScheduler;

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::DispatchApiDoc;
}
