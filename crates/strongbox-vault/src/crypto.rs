// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cipher primitive: AES-256-GCM seal/open, the framed item ciphertext format,
//! CSPRNG helpers, and constant-time comparison.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.
//!
//! Item ciphertext layout (version 1):
//!
//! ```text
//! 0x01 | nonce (12) | AES-256-GCM ciphertext + tag (16)
//! ```

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// AES-256 key length.
pub const KEY_LEN: usize = 32;

/// GCM nonce length.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// Current item ciphertext format.
pub const CIPHERTEXT_VERSION: u8 = 1;

/// Bytes added to a plaintext by [`encrypt`].
pub const CIPHERTEXT_OVERHEAD: usize = 1 + NONCE_LEN + TAG_LEN;

/// A raw AES-256 key, zeroed on drop.
pub type RawKey = Zeroizing<[u8; KEY_LEN]>;

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, CryptoError> {
    let unbound =
        UnboundKey::new(&AES_256_GCM, key).map_err(|_| CryptoError::Malformed("AES-256-GCM key"))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN]), CryptoError> {
    let nonce_bytes = random_bytes::<NONCE_LEN>()?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: the buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    aead_key(key)?
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| CryptoError::Integrity)?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt ciphertext (with appended tag) produced by [`seal`].
///
/// Fails with [`CryptoError::Integrity`] if the key is wrong or the data was
/// tampered with. The returned plaintext is zeroed on drop.
pub fn open(
    key: &[u8; KEY_LEN],
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let nonce = Nonce::assume_unique_for_key(*nonce_bytes);

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = aead_key(key)?
        .open_in_place(nonce, Aad::empty(), in_out.as_mut_slice())
        .map_err(|_| CryptoError::Integrity)?
        .len();
    in_out.truncate(plaintext_len);

    Ok(in_out)
}

/// Encrypt an item secret into the framed format, refusing to produce more
/// than `max_len` bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8; KEY_LEN], max_len: usize) -> Result<Vec<u8>, CryptoError> {
    let (sealed, nonce) = seal(key, plaintext)?;

    let mut framed = Vec::with_capacity(1 + NONCE_LEN + sealed.len());
    framed.push(CIPHERTEXT_VERSION);
    framed.extend_from_slice(&nonce);
    framed.extend_from_slice(&sealed);

    if framed.len() > max_len {
        return Err(CryptoError::Oversize {
            what: "ciphertext",
            actual: framed.len(),
            max: max_len,
        });
    }
    Ok(framed)
}

/// Decrypt a framed item ciphertext.
///
/// Anything not produced by [`encrypt`] under `key` fails with
/// [`CryptoError::Integrity`]. A frame with a newer version byte fails with
/// [`CryptoError::UnsupportedVersion`].
pub fn decrypt(ciphertext: &[u8], key: &[u8; KEY_LEN]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if ciphertext.len() < CIPHERTEXT_OVERHEAD {
        return Err(CryptoError::Integrity);
    }
    let (version, rest) = ciphertext.split_at(1);
    if version[0] != CIPHERTEXT_VERSION {
        return Err(CryptoError::UnsupportedVersion {
            what: "ciphertext",
            version: version[0],
        });
    }
    let (nonce, sealed) = rest.split_at(NONCE_LEN);
    let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|_| CryptoError::Integrity)?;
    open(key, &nonce, sealed)
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<RawKey, CryptoError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    SystemRandom::new()
        .fill(&mut key[..])
        .map_err(|_| CryptoError::Rng)?;
    Ok(key)
}

/// Fill a fixed-size array from the system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut bytes = [0u8; N];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| CryptoError::Rng)?;
    Ok(bytes)
}

/// Compare two byte strings in time independent of their contents.
#[allow(deprecated)]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    ring::constant_time::verify_slices_are_equal(a, b).is_ok()
}
