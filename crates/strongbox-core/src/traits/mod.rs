// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits consumed by the rotation engine.
//!
//! Storage is async and object-safe via `#[async_trait]`; reporting is a plain
//! synchronous observer called from the sweep loop.

pub mod reporter;
pub mod store;

pub use reporter::{NullReporter, RotationReporter};
pub use store::SecretStore;
