//! Core domain layer for the validator commission burn engine.
//!
//! This crate contains the unit converter, domain models, port traits
//! (interfaces) and the services that turn raw validator data into burn
//! reports. It follows hexagonal architecture principles - this is the
//! innermost layer with no dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     tacburn (binary)                        │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │        tacburn-cosmos        │       tacburn-storage        │
//! │        (REST client)         │       (report cache)         │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │                     tacburn-core  ← YOU ARE HERE            │
//! │            (units, models, ports, services)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`units`] - Exact base-unit arithmetic and display formatting
//! - [`models`] - Domain models (ValidatorDetails, BurnReport, Period, etc.)
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Core logic (processor, aggregation, alerts, periods)
//! - [`config`] - Burn policy configuration
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Burn base
//!
//! Only validator commission (claimed + unclaimed) is subject to the burn.
//! Delegator-facing outstanding rewards are reported but never burned.
//! The split is done on integers: burn is floored, keep is the remainder,
//! so `burn + keep` always equals the commission exactly.
//!
//! ## Report Lifecycle
//!
//! 1. Resolve and gate the period (future periods are rejected)
//! 2. Fetch every restricted validator concurrently
//! 3. Process each record (strict or lenient commission checks)
//! 4. Aggregate totals and derive alerts
//! 5. Return an immutable [`models::BurnReport`]

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
pub mod units;
