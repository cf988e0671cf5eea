// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Polling waits used by create, update and delete to observe the cluster
//! converging on the desired state.

pub mod condition;
pub mod poller;

pub use condition::{Condition, FetchError, WaitSpec};
pub use poller::{wait_until, WaitOutcome};
