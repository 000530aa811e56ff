// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Hyperdrive Daemon - NodeSet companion service
//!
//! Owns the node wallet capability and a single authenticated session with
//! the NodeSet service, and exposes NodeSet registration plus the
//! Constellation and StakeWise module operations over a local HTTP API.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `nodeset` - NodeSet v3 client, session manager and module sub-clients
//! - `requirements` - Preconditions checked before touching NodeSet
//! - `wallet` - Node wallet key and address

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod nodeset;
pub mod requirements;
pub mod state;
pub mod wallet;

#[cfg(test)]
mod testing;
