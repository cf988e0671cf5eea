// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Terraform resources and data sources backed by one generic engine.

pub mod catalog;
pub mod data_source;
pub mod engine;
pub mod id;
pub mod model;

pub use catalog::{catalog, find_kind, ProviderResource, ResourceKind};
pub use data_source::DataSource;
pub use engine::ResourceEngine;
pub use id::ResourceId;
pub use model::{Metadata, ResourceModel, WaitForField, WaitSettings};
