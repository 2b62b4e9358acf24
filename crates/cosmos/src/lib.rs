//! Cosmos SDK REST adapter for the burn engine.
//!
//! This crate implements the [`ChainDataProvider`] port from `tacburn-core`,
//! reading staking and distribution state through a node's REST
//! (gRPC-gateway) endpoint.
//!
//! # Features
//!
//! - Validator metadata, outstanding rewards and unclaimed commission
//! - Commission withdrawn during a period, from the tx search index
//! - Per-request timeout and retry with exponential backoff
//!
//! # Usage
//!
//! ```ignore
//! use tacburn_cosmos::{CosmosClientConfig, CosmosRestClient};
//!
//! let client = CosmosRestClient::new(CosmosClientConfig {
//!     rest_url: "http://localhost:1317".to_string(),
//!     ..Default::default()
//! })?;
//! let network = client.node_chain_id().await?;
//! let data = client.fetch_validator("tacvaloper1...", &period).await?;
//! ```
//!
//! [`ChainDataProvider`]: tacburn_core::ports::ChainDataProvider

mod client;
mod types;

pub use client::{CosmosClientConfig, CosmosRestClient};
