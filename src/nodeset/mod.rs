// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # NodeSet
//!
//! Client for the NodeSet service that authorizes the node for the
//! Constellation and StakeWise staking modules.
//!
//! - [`client`]: stateless v3 HTTP transport.
//! - [`manager`]: session token, registration status, login and retry.
//! - [`stakewise`] / [`constellation`]: module operations returning flag
//!   results.

pub mod client;
pub mod constellation;
pub mod error;
pub mod manager;
pub mod stakewise;
pub mod types;

pub use client::NodeSetClient;
pub use error::NodeSetError;
pub use manager::{NodeSetServiceManager, RegistrationResult, RegistrationStatus};
