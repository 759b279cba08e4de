//! In-memory ledger with optional JSON seed and snapshot files

use async_trait::async_trait;
use carledger_config::LedgerConfig;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::{CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::{Car, CarRecord, ChangeKind, HistoryEntry, LedgerEntry};
use crate::wire;
use crate::LedgerController;

/// Persisted ledger state
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerState {
    cars: BTreeMap<String, CarRecord>,
    #[serde(default)]
    history: BTreeMap<String, Vec<HistoryEntry>>,
    #[serde(default)]
    next_seq: u64,
}

impl LedgerState {
    fn put(&mut self, car: Car, kind: ChangeKind) -> Car {
        self.next_seq += 1;
        self.cars.insert(car.id.clone(), car.record());
        self.history
            .entry(car.id.clone())
            .or_default()
            .push(HistoryEntry {
                seq: self.next_seq,
                kind,
                car: car.clone(),
                at: Utc::now(),
            });
        car
    }
}

/// Car ledger kept in memory.
///
/// Writers are serialized by the lock. When a snapshot file is configured the
/// whole state is rewritten after every write, before the write is reported,
/// and the write lock is held until the snapshot is on disk.
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
    snapshot: Option<PathBuf>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    /// Create an empty ledger without persistence
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            snapshot: None,
        }
    }

    /// Create a ledger holding the given cars, each recorded as a create.
    /// Ids are not checked here.
    pub fn with_cars(cars: impl IntoIterator<Item = Car>) -> Self {
        let mut state = LedgerState::default();
        for car in cars {
            state.put(car, ChangeKind::Create);
        }
        Self {
            state: RwLock::new(state),
            snapshot: None,
        }
    }

    /// Open a ledger from configuration.
    ///
    /// An existing snapshot wins over the seed file; the seed is only applied
    /// to an empty ledger.
    pub async fn open(config: &LedgerConfig) -> CoreResult<Self> {
        let mut ledger = Self::new();

        if let Some(path) = &config.snapshot_file {
            if path.exists() {
                let state = read_snapshot(path).await?;
                log::info!(
                    target: "carledger::ledger",
                    "Loaded snapshot {} ({} cars)",
                    path.display(),
                    state.cars.len()
                );
                ledger.state = RwLock::new(state);
            }
            ledger.snapshot = Some(path.clone());
        }

        if let Some(seed) = &config.seed_file {
            if ledger.len().await == 0 {
                let cars = read_seed(seed).await?;
                for car in &cars {
                    wire::validate_id(&car.id)?;
                }
                log::info!(
                    target: "carledger::ledger",
                    "Seeding ledger from {} ({} cars)",
                    seed.display(),
                    cars.len()
                );
                let mut state = ledger.state.write().await;
                for car in cars {
                    state.put(car, ChangeKind::Create);
                }
                let context = ErrorContext::new("seed")
                    .with_data("seed_file", serde_json::json!(seed.display().to_string()));
                ledger.persist(&state, context).await?;
                drop(state);
            } else {
                log::debug!(target: "carledger::ledger", "Snapshot present, seed file ignored");
            }
        }

        Ok(ledger)
    }

    /// Number of cars stored
    pub async fn len(&self) -> usize {
        self.state.read().await.cars.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Write `state` to the snapshot file. Callers hold the write lock.
    async fn persist(&self, state: &LedgerState, context: ErrorContext) -> CoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let result = match serde_json::to_vec_pretty(state) {
            Ok(json) => write_atomically(path, &json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            let context = context.with_data("snapshot_file", serde_json::json!(path.display().to_string()));
            DefaultErrorLogger.log_error(e, &context);
        }
        result
    }
}

async fn read_snapshot(path: &Path) -> CoreResult<LedgerState> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn read_seed(path: &Path) -> CoreResult<Vec<Car>> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl LedgerController for MemoryLedger {
    async fn get_car(&self, id: &str) -> CoreResult<Option<Car>> {
        let state = self.state.read().await;
        Ok(state.cars.get(id).cloned().map(|record| record.with_id(id)))
    }

    async fn add_car(&self, car: Car) -> CoreResult<Car> {
        wire::validate_id(&car.id)?;
        let context = ErrorContext::new("add_car").with_data("id", serde_json::json!(car.id));

        let mut state = self.state.write().await;
        if state.cars.contains_key(&car.id) {
            DefaultErrorLogger.log_warning("overwriting an existing car", &context);
        }
        let car = state.put(car, ChangeKind::Create);
        self.persist(&state, context).await?;
        drop(state);

        log::info!(target: "carledger::ledger", "Recorded car {} for {}", car.id, car.owner);
        Ok(car)
    }

    async fn get_all_cars(&self) -> CoreResult<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .cars
            .iter()
            .map(|(id, record)| LedgerEntry {
                id: id.clone(),
                record: record.clone(),
            })
            .collect())
    }

    async fn change_holder(&self, id: &str, holder: &str) -> CoreResult<Option<Car>> {
        let mut state = self.state.write().await;
        let Some(record) = state.cars.get(id).cloned() else {
            return Ok(None);
        };
        let mut car = record.with_id(id);
        car.owner = holder.to_string();
        let car = state.put(car, ChangeKind::Transfer);
        let context = ErrorContext::new("change_holder").with_data("id", serde_json::json!(id));
        self.persist(&state, context).await?;
        drop(state);

        log::info!(target: "carledger::ledger", "Car {} now held by {}", car.id, car.owner);
        Ok(Some(car))
    }

    async fn history(&self, id: &str) -> CoreResult<Vec<HistoryEntry>> {
        let state = self.state.read().await;
        Ok(state.history.get(id).cloned().unwrap_or_default())
    }
}
