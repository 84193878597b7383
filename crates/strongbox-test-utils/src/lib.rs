// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Strongbox integration tests.
//!
//! Provides mock adapters, fixtures and a temp-database harness for fast,
//! deterministic, CI-runnable rotation tests.
//!
//! # Components
//!
//! - [`MockStore`] - In-memory secret table with failure injection
//! - [`RecordingReporter`] - Reporter that captures every callback
//! - [`TestVault`] - Temp SQLite vault with live and history stores
//! - [`fixtures`] - Cheap KDF settings and sealed record builders

pub mod fixtures;
pub mod harness;
pub mod mock_reporter;
pub mod mock_store;

pub use harness::TestVault;
pub use mock_reporter::RecordingReporter;
pub use mock_store::MockStore;
