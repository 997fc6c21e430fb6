//! budget-lens - budget and transaction analytics engine
//!
//! Records dated, categorized spending transactions and monthly per-category
//! budget ceilings, then derives trends, budget-vs-actual performance,
//! suggestions and insights. A simulator answers "what if" questions by
//! overlaying hypothetical transactions and ceilings on a copy of the data.
//!
//! # Architecture
//!
//! - `config`: Paths and settings
//! - `error`: Custom error types
//! - `models`: Core data models (transactions, budgets, months, money)
//! - `storage`: In-memory stores with JSON snapshots
//! - `services`: Analytics engine, simulator and categorizer
//! - `export`: CSV and JSON import/export
//! - `backup`: Archives of the data directory and validated restore
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `budget-lens` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use budget_lens::config::{paths::LensPaths, settings::Settings};
//! use budget_lens::services::AnalyticsEngine;
//! use budget_lens::storage::Storage;
//!
//! let paths = LensPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let engine = AnalyticsEngine::from_storage(&storage, settings.analytics);
//! let rows = engine.category_performance("2025-08".parse()?)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LensError, LensResult};
