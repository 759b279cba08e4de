//! Per-operation UI state driven by `CarApi` results

use crate::{CarApi, CarLookup, HolderOutcome};
use carledger_core::wire::{CAR_NOT_FOUND, HOLDER_CAR_NOT_FOUND};
use carledger_core::{sort_by_numeric_id, Car, HolderChange, LedgerEntry};
use std::sync::{Mutex, PoisonError};

/// State of one operation as a view would render it
#[derive(Debug, Clone, PartialEq)]
pub enum OpState<T> {
    Idle,
    Pending,
    Success(T),
    Error(String),
}

impl<T> Default for OpState<T> {
    fn default() -> Self {
        OpState::Idle
    }
}

impl<T> OpState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, OpState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OpState::Pending)
    }

    pub fn shows_success(&self) -> bool {
        matches!(self, OpState::Success(_))
    }

    pub fn shows_error(&self) -> bool {
        matches!(self, OpState::Error(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            OpState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OpState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Latest state of every operation
#[derive(Debug, Default)]
struct Views {
    all_cars: OpState<Vec<Car>>,
    query_car: OpState<Car>,
    create_car: OpState<Car>,
    change_holder: OpState<Car>,
}

/// Holds the result of the latest call of each operation.
///
/// Each call moves its own state to `Pending` and then to `Success` or
/// `Error`; the other operations are left alone. States live behind a lock,
/// so a view holding a shared reference sees `Pending` while a call is in
/// flight. Transport failures end in `Error` too, so no operation stays
/// pending once its call returns.
pub struct Dashboard<A: CarApi> {
    api: A,
    views: Mutex<Views>,
}

impl<A: CarApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            views: Mutex::new(Views::default()),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Views) -> T) -> T {
        let views = self.views.lock().unwrap_or_else(PoisonError::into_inner);
        f(&*views)
    }

    fn update(&self, f: impl FnOnce(&mut Views)) {
        let mut views = self.views.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *views)
    }

    pub fn all_cars(&self) -> OpState<Vec<Car>> {
        self.read(|v| v.all_cars.clone())
    }

    pub fn query_car(&self) -> OpState<Car> {
        self.read(|v| v.query_car.clone())
    }

    pub fn create_car(&self) -> OpState<Car> {
        self.read(|v| v.create_car.clone())
    }

    pub fn change_holder(&self) -> OpState<Car> {
        self.read(|v| v.change_holder.clone())
    }

    /// Load every car, sorted ascending by numeric id
    pub async fn load_all_cars(&self) -> OpState<Vec<Car>> {
        self.update(|v| v.all_cars = OpState::Pending);
        let state = match self.api.query_all_cars().await {
            Ok(entries) => OpState::Success(display_rows(entries)),
            Err(e) => OpState::Error(e.to_string()),
        };
        self.update(|v| v.all_cars = state.clone());
        state
    }

    pub async fn lookup_car(&self, id: &str) -> OpState<Car> {
        self.update(|v| v.query_car = OpState::Pending);
        let state = match self.api.query_car(id).await {
            Ok(CarLookup::Found(car)) => OpState::Success(car),
            Ok(CarLookup::NotFound) => OpState::Error(CAR_NOT_FOUND.to_string()),
            Err(e) => OpState::Error(e.to_string()),
        };
        self.update(|v| v.query_car = state.clone());
        state
    }

    pub async fn record_car(&self, car: &Car) -> OpState<Car> {
        self.update(|v| v.create_car = OpState::Pending);
        let state = match self.api.record_car(car).await {
            Ok(car) => OpState::Success(car),
            Err(e) => OpState::Error(e.to_string()),
        };
        self.update(|v| v.create_car = state.clone());
        state
    }

    pub async fn transfer(&self, change: &HolderChange) -> OpState<Car> {
        self.update(|v| v.change_holder = OpState::Pending);
        let state = match self.api.change_holder(change).await {
            Ok(HolderOutcome::Changed(car)) => OpState::Success(car),
            Ok(HolderOutcome::NoSuchCar) => OpState::Error(HOLDER_CAR_NOT_FOUND.to_string()),
            Err(e) => OpState::Error(e.to_string()),
        };
        self.update(|v| v.change_holder = state.clone());
        state
    }
}

/// Flatten ledger entries into cars and sort them for display
pub fn display_rows(entries: Vec<LedgerEntry>) -> Vec<Car> {
    let mut cars: Vec<Car> = entries.into_iter().map(LedgerEntry::into_car).collect();
    sort_by_numeric_id(&mut cars);
    cars
}
