// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation and dynamic object access.

pub mod client;
pub mod dynamic;

pub use client::create_client;
pub use dynamic::{apply_object, delete_object, fetch_document, get_object, DynamicTarget};
