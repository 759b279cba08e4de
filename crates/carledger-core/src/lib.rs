//! Core car-ledger processing and business logic

pub mod error;
pub mod ledger;
pub mod models;
pub mod wire;

use async_trait::async_trait;
use std::sync::Arc;

pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity};
pub use ledger::MemoryLedger;
pub use models::{sort_by_numeric_id, Car, CarRecord, ChangeKind, HistoryEntry, HolderChange, LedgerEntry};

/// Shared ledger reference type
pub type LedgerRef = Arc<dyn LedgerController>;

/// Reads and writes car records in the ledger.
///
/// Misses are `Ok(None)`, not errors; translating a miss into a response is
/// left to the caller.
#[async_trait]
pub trait LedgerController: Send + Sync {
    /// Look up one car by key
    async fn get_car(&self, id: &str) -> CoreResult<Option<Car>>;

    /// Put a car under its key, overwriting any previous record.
    /// Ids that are empty or contain `-` are rejected.
    async fn add_car(&self, car: Car) -> CoreResult<Car>;

    /// All entries in ascending key order
    async fn get_all_cars(&self) -> CoreResult<Vec<LedgerEntry>>;

    /// Set a new holder on an existing car
    async fn change_holder(&self, id: &str, holder: &str) -> CoreResult<Option<Car>>;

    /// Writes applied to one key, oldest first
    async fn history(&self, id: &str) -> CoreResult<Vec<HistoryEntry>>;
}
