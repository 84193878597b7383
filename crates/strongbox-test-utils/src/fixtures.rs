// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record builders and cheap KDF settings.
//!
//! Production Argon2id costs make every test take seconds; everything here
//! uses [`FAST_KDF`] instead.

use secrecy::SecretString;
use strongbox_core::{RecordId, SecretRecord};
use strongbox_vault::fingerprint;
use strongbox_vault::{open_secret, CryptoError, KdfParams, Limits, RotationOptions, Sealer};

/// The cheapest parameters Argon2id accepts for a single lane.
pub const FAST_KDF: KdfParams = KdfParams {
    memory_cost: 1024,
    iterations: 1,
    parallelism: 1,
};

/// Rotation options using [`FAST_KDF`] and default limits.
pub fn fast_options(flush_every: usize) -> RotationOptions {
    RotationOptions {
        kdf: FAST_KDF,
        limits: Limits::default(),
        flush_every: flush_every.max(1),
        demo_mode: false,
    }
}

pub fn passphrase(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

/// A fresh fingerprint of `passphrase`.
pub fn fingerprint_of(passphrase: &SecretString) -> String {
    fingerprint::fingerprint(passphrase, &FAST_KDF).expect("fingerprint with test parameters")
}

/// A record sealed under `passphrase` and tagged with `fingerprint`.
pub fn sealed_record(
    id: i64,
    label: &str,
    plaintext: &[u8],
    passphrase: &SecretString,
    fingerprint: &str,
) -> SecretRecord {
    let sealer = Sealer::new(
        passphrase,
        fingerprint.to_string(),
        FAST_KDF,
        Limits::default(),
    )
    .expect("fingerprint belongs to passphrase");
    let sealed = sealer.seal(plaintext).expect("seal test record");
    SecretRecord {
        id: RecordId(id),
        label: label.to_string(),
        ciphertext: sealed.ciphertext,
        wrapped_key: sealed.wrapped_key,
        fingerprint: Some(sealed.fingerprint),
    }
}

/// A record with nothing to rotate.
pub fn empty_record(id: i64, label: &str) -> SecretRecord {
    SecretRecord {
        id: RecordId(id),
        label: label.to_string(),
        ciphertext: Vec::new(),
        wrapped_key: Vec::new(),
        fingerprint: None,
    }
}

/// Decrypt a record into an owned buffer for assertions.
pub fn open_record(record: &SecretRecord, passphrase: &SecretString) -> Result<Vec<u8>, CryptoError> {
    open_secret(record, passphrase, &FAST_KDF).map(|plaintext| plaintext.to_vec())
}
