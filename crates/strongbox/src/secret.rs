// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item secret input.

use std::io::{IsTerminal, Read};

use strongbox_core::StrongboxError;
use zeroize::Zeroizing;

/// Read an item secret: hidden prompt on a terminal, otherwise all of stdin
/// with one trailing newline removed.
pub fn read_secret(name: &str) -> Result<Zeroizing<Vec<u8>>, StrongboxError> {
    let stdin = std::io::stdin();
    let value = if stdin.is_terminal() {
        eprint!("Secret for {name}: ");
        Zeroizing::new(
            rpassword::read_password()
                .map_err(|e| StrongboxError::Internal(format!("failed to read secret: {e}")))?
                .into_bytes(),
        )
    } else {
        let mut buf = Zeroizing::new(Vec::new());
        stdin
            .lock()
            .read_to_end(&mut buf)
            .map_err(|e| StrongboxError::Internal(format!("failed to read secret: {e}")))?;
        trim_newline(buf)
    };
    Ok(value)
}

fn trim_newline(mut buf: Zeroizing<Vec<u8>>) -> Zeroizing<Vec<u8>> {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    buf
}
