// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope encryption and master passphrase rotation.
//!
//! Every item secret is encrypted under its own random AES-256-GCM key. That
//! item key is wrapped under a key derived from the master passphrase via
//! Argon2id, and the record is tagged with a fingerprint of the passphrase
//! generation that wrapped it. Rotating the master passphrase re-wraps every
//! record, live and historical, one record at a time.

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod fingerprint;
pub mod kdf;
pub mod prompt;
pub mod rotation;
pub mod wrapping;

pub use envelope::{open_secret, Limits, Sealer};
pub use error::CryptoError;
pub use kdf::KdfParams;
pub use prompt::{get_new_passphrase, get_passphrase};
pub use rotation::{RotationOptions, RotationRequest, Rotator};
