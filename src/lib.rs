//! # Cryptoton - Crypto Price Tracker
//!
//! A polling price tracker for crypto assets with threshold alerts, holdings
//! valuation and a deterministic demo mode when the upstream API is down.
//!
//! ## Architecture
//!
//! - **App**: Orchestrates fetching, timers, alerts and holdings
//! - **API**: CoinGecko integration, query building and synthetic data
//! - **Engine**: Fetch pipeline, alert evaluation, sorting and polling
//! - **State**: Centralized state management
//! - **Storage**: Persisted holdings
//! - **Events**: Line command input
//! - **Config**: Configuration management

pub mod api;
pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod format;
pub mod state;
pub mod storage;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
