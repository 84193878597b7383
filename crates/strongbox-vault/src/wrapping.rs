// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item key wrapping under a passphrase-derived key.
//!
//! Each wrapped key is self-describing: it carries the Argon2id parameters and
//! salt used to derive its wrapping key, so changing the configured cost only
//! affects keys wrapped afterwards.
//!
//! ```text
//! 0x01 | m_cost u32 BE | t_cost u32 BE | p_cost u32 BE | salt (16) | nonce (12) | sealed key (32) + tag (16)
//! ```

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN, NONCE_LEN, RawKey, TAG_LEN};
use crate::error::CryptoError;
use crate::kdf::{self, KdfParams, SALT_LEN};

/// Current wrapped key format.
pub const WRAPPED_KEY_VERSION: u8 = 1;

/// Exact length of a version 1 wrapped key.
pub const WRAPPED_KEY_LEN: usize = 1 + 12 + SALT_LEN + NONCE_LEN + KEY_LEN + TAG_LEN;

/// Generate a fresh item key and wrap it under `passphrase`.
///
/// Returns the raw item key (zeroed on drop) and its wrapped form.
pub fn wrap(passphrase: &SecretString, params: &KdfParams) -> Result<(RawKey, Vec<u8>), CryptoError> {
    let item_key = crypto::generate_random_key()?;
    let wrapped = wrap_key(&item_key, passphrase, params)?;
    Ok((item_key, wrapped))
}

/// Wrap an existing item key under `passphrase`.
pub fn wrap_key(
    item_key: &[u8; KEY_LEN],
    passphrase: &SecretString,
    params: &KdfParams,
) -> Result<Vec<u8>, CryptoError> {
    let salt = kdf::generate_salt()?;
    let wrapping_key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, params)?;
    let (sealed, nonce) = crypto::seal(&wrapping_key, item_key)?;

    let mut out = Vec::with_capacity(WRAPPED_KEY_LEN);
    out.push(WRAPPED_KEY_VERSION);
    out.extend_from_slice(&params.memory_cost.to_be_bytes());
    out.extend_from_slice(&params.iterations.to_be_bytes());
    out.extend_from_slice(&params.parallelism.to_be_bytes());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);

    debug_assert_eq!(out.len(), WRAPPED_KEY_LEN);
    Ok(out)
}

/// Recover the item key from its wrapped form.
///
/// The stored parameters are used for derivation once they pass
/// [`KdfParams::check_stored`] against the configured `kdf`; anything above
/// the ceiling fails with [`CryptoError::Kdf`] without running Argon2id.
/// A wrong passphrase or tampered bytes fail with [`CryptoError::Unwrap`].
/// Bytes that do not follow the layout fail with [`CryptoError::Malformed`].
pub fn unwrap(
    wrapped: &[u8],
    passphrase: &SecretString,
    kdf: &KdfParams,
) -> Result<RawKey, CryptoError> {
    if wrapped.len() != WRAPPED_KEY_LEN {
        return Err(CryptoError::Malformed("wrapped key"));
    }
    if wrapped[0] != WRAPPED_KEY_VERSION {
        return Err(CryptoError::UnsupportedVersion {
            what: "wrapped key",
            version: wrapped[0],
        });
    }

    let params = KdfParams {
        memory_cost: read_u32(&wrapped[1..5])?,
        iterations: read_u32(&wrapped[5..9])?,
        parallelism: read_u32(&wrapped[9..13])?,
    };
    kdf.check_stored(&params)?;
    let salt: [u8; SALT_LEN] = wrapped[13..13 + SALT_LEN]
        .try_into()
        .map_err(|_| CryptoError::Malformed("wrapped key salt"))?;
    let nonce_start = 13 + SALT_LEN;
    let nonce: [u8; NONCE_LEN] = wrapped[nonce_start..nonce_start + NONCE_LEN]
        .try_into()
        .map_err(|_| CryptoError::Malformed("wrapped key nonce"))?;
    let sealed = &wrapped[nonce_start + NONCE_LEN..];

    let wrapping_key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, &params)?;
    let opened = crypto::open(&wrapping_key, &nonce, sealed).map_err(|_| CryptoError::Unwrap)?;

    let mut item_key = Zeroizing::new([0u8; KEY_LEN]);
    if opened.len() != KEY_LEN {
        return Err(CryptoError::Malformed("unwrapped item key"));
    }
    item_key.copy_from_slice(&opened);
    Ok(item_key)
}

fn read_u32(bytes: &[u8]) -> Result<u32, CryptoError> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| CryptoError::Malformed("wrapped key parameters"))?;
    Ok(u32::from_be_bytes(arr))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: KdfParams = KdfParams {
        memory_cost: 1024,
        iterations: 1,
        parallelism: 1,
    };

    fn pass(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn wrapped_key_has_fixed_length() {
        assert_eq!(WRAPPED_KEY_LEN, 89);
        let (_, wrapped) = wrap(&pass("alpha"), &FAST).unwrap();
        assert_eq!(wrapped.len(), WRAPPED_KEY_LEN);
        assert_eq!(wrapped[0], WRAPPED_KEY_VERSION);
    }

    #[test]
    fn unwrap_recovers_the_item_key() {
        let (key, wrapped) = wrap(&pass("alpha"), &FAST).unwrap();
        let recovered = unwrap(&wrapped, &pass("alpha"), &FAST).unwrap();
        assert_eq!(*key, *recovered);
    }

    #[test]
    fn wrong_passphrase_fails_to_unwrap() {
        let (_, wrapped) = wrap(&pass("alpha"), &FAST).unwrap();
        assert!(matches!(
            unwrap(&wrapped, &pass("beta"), &FAST),
            Err(CryptoError::Unwrap)
        ));
    }

    #[test]
    fn header_records_kdf_parameters() {
        let params = KdfParams {
            memory_cost: 2048,
            iterations: 2,
            parallelism: 1,
        };
        let (key, wrapped) = wrap(&pass("alpha"), &params).unwrap();
        assert_eq!(&wrapped[1..5], &2048u32.to_be_bytes());
        assert_eq!(&wrapped[5..9], &2u32.to_be_bytes());
        assert_eq!(&wrapped[9..13], &1u32.to_be_bytes());

        // Derivation uses the stored parameters, not the configured ones.
        assert_eq!(*unwrap(&wrapped, &pass("alpha"), &FAST).unwrap(), *key);
    }

    #[test]
    fn same_key_wraps_differently_each_time() {
        let key = crypto::generate_random_key().unwrap();
        let a = wrap_key(&key, &pass("alpha"), &FAST).unwrap();
        let b = wrap_key(&key, &pass("alpha"), &FAST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_wrapped_key_fails_to_unwrap() {
        let (_, mut wrapped) = wrap(&pass("alpha"), &FAST).unwrap();
        wrapped[WRAPPED_KEY_LEN - 1] ^= 0xFF;
        assert!(matches!(
            unwrap(&wrapped, &pass("alpha"), &FAST),
            Err(CryptoError::Unwrap)
        ));
    }

    #[test]
    fn wrong_length_is_malformed() {
        assert!(matches!(
            unwrap(&[1u8; 40], &pass("alpha"), &FAST),
            Err(CryptoError::Malformed("wrapped key"))
        ));
        assert!(matches!(
            unwrap(&[], &pass("alpha"), &FAST),
            Err(CryptoError::Malformed(_))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let (_, mut wrapped) = wrap(&pass("alpha"), &FAST).unwrap();
        wrapped[0] = 2;
        assert!(matches!(
            unwrap(&wrapped, &pass("alpha"), &FAST),
            Err(CryptoError::UnsupportedVersion {
                what: "wrapped key",
                version: 2
            })
        ));
    }

    #[test]
    fn absurd_stored_memory_cost_is_refused() {
        let (_, mut wrapped) = wrap(&pass("alpha"), &FAST).unwrap();
        wrapped[1..5].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            unwrap(&wrapped, &pass("alpha"), &FAST),
            Err(CryptoError::Kdf(_))
        ));
    }

    #[test]
    fn inflated_stored_iterations_are_refused_before_derivation() {
        let (_, wrapped) = wrap(&pass("alpha"), &FAST).unwrap();

        // One flipped bit in the pass count: 1 -> 16385.
        let mut low_flip = wrapped.clone();
        low_flip[7] ^= 0x40;
        // One flipped bit in the top byte: 1 -> 2^24 + 1.
        let mut high_flip = wrapped.clone();
        high_flip[5] ^= 0x01;

        for hostile in [low_flip, high_flip] {
            let started = std::time::Instant::now();
            let err = unwrap(&hostile, &pass("alpha"), &FAST).unwrap_err();
            assert!(matches!(err, CryptoError::Kdf(msg) if msg.contains("ceiling")));
            assert!(started.elapsed() < std::time::Duration::from_secs(1));
        }
    }

    #[test]
    fn inflated_stored_parallelism_is_refused() {
        let (_, mut wrapped) = wrap(&pass("alpha"), &FAST).unwrap();
        wrapped[9..13].copy_from_slice(&64u32.to_be_bytes());
        assert!(matches!(
            unwrap(&wrapped, &pass("alpha"), &FAST),
            Err(CryptoError::Kdf(_))
        ));
    }
}
