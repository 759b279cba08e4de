//! HTTP client for the legacy car routes
//!
//! `CarClient` issues the same GET requests the browser client did and turns
//! the sentinel bodies into typed outcomes at the edge. `Dashboard` keeps one
//! `OpState` per operation for whatever renders the results.

pub mod dashboard;
pub mod error;

use async_trait::async_trait;
use carledger_config::ClientConfig;
use carledger_core::wire::{self, CAR_NOT_FOUND, HOLDER_CAR_NOT_FOUND};
use carledger_core::{Car, CarRecord, HistoryEntry, HolderChange, LedgerEntry};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use dashboard::{Dashboard, OpState};
pub use error::{ClientError, ClientResult};

/// Result of a car lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarLookup {
    Found(Car),
    NotFound,
}

/// Result of a holder change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderOutcome {
    Changed(Car),
    NoSuchCar,
}

// ==================== Request Paths ====================

pub fn all_cars_path() -> &'static str {
    "/get_all_cars/"
}

pub fn query_car_path(id: &str) -> String {
    format!("/get_car/{}", urlencoding::encode(id))
}

/// `/add_car/id-model-make-owner-color`
pub fn record_car_path(car: &Car) -> String {
    format!("/add_car/{}", urlencoding::encode(&wire::encode_car(car)))
}

/// `/change_holder/id-name`
pub fn change_holder_path(change: &HolderChange) -> String {
    format!("/change_holder/{}", urlencoding::encode(&wire::encode_holder(change)))
}

// ==================== Client Trait ====================

/// The four car operations as async calls
#[async_trait]
pub trait CarApi: Send + Sync {
    async fn query_all_cars(&self) -> ClientResult<Vec<LedgerEntry>>;

    async fn query_car(&self, id: &str) -> ClientResult<CarLookup>;

    async fn record_car(&self, car: &Car) -> ClientResult<Car>;

    async fn change_holder(&self, change: &HolderChange) -> ClientResult<HolderOutcome>;
}

/// reqwest-backed `CarApi`
#[derive(Debug, Clone)]
pub struct CarClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CarClient {
    /// Create a client for the server at `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url, timeout })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Writes applied to one car, from the JSON API
    pub async fn history(&self, id: &str) -> ClientResult<Vec<HistoryEntry>> {
        let path = format!("/api/cars/{}/history", urlencoding::encode(id));
        let body = self.get_text(&path, "history").await?;
        decode(&body, "history")
    }

    /// GET a path and return the body of a 2xx response
    async fn get_text(&self, path: &str, operation: &str) -> ClientResult<String> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!(target: "carledger::client", "{} GET {}", operation, url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(operation, e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| self.request_error(operation, e))?;

        if !status.is_success() {
            log::warn!(target: "carledger::client", "{} returned HTTP {}", operation, status);
            return Err(ClientError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// The timeout covers the whole exchange, so it can fire while sending or
    /// while reading the body
    fn request_error(&self, operation: &str, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout {
                operation: operation.to_string(),
                timeout_ms: self.timeout.as_millis(),
            }
        } else {
            ClientError::Transport {
                operation: operation.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str, operation: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(|e| ClientError::Decode {
        operation: operation.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl CarApi for CarClient {
    async fn query_all_cars(&self) -> ClientResult<Vec<LedgerEntry>> {
        let body = self.get_text(all_cars_path(), "query_all_cars").await?;
        decode(&body, "query_all_cars")
    }

    async fn query_car(&self, id: &str) -> ClientResult<CarLookup> {
        let body = self.get_text(&query_car_path(id), "query_car").await?;
        if body == CAR_NOT_FOUND {
            return Ok(CarLookup::NotFound);
        }
        let record: CarRecord = decode(&body, "query_car")?;
        Ok(CarLookup::Found(record.with_id(id)))
    }

    async fn record_car(&self, car: &Car) -> ClientResult<Car> {
        let body = self.get_text(&record_car_path(car), "record_car").await?;
        let record: CarRecord = decode(&body, "record_car")?;
        Ok(record.with_id(car.id.clone()))
    }

    async fn change_holder(&self, change: &HolderChange) -> ClientResult<HolderOutcome> {
        let body = self.get_text(&change_holder_path(change), "change_holder").await?;
        if body == HOLDER_CAR_NOT_FOUND {
            return Ok(HolderOutcome::NoSuchCar);
        }
        let record: CarRecord = decode(&body, "change_holder")?;
        Ok(HolderOutcome::Changed(record.with_id(change.id.clone())))
    }
}
