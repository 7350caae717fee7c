// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipient normalization into transport chat addresses.

/// Domain appended to bare numbers (direct user chats).
pub const DEFAULT_USER_DOMAIN: &str = "c.us";

/// Canonicalize a recipient identifier into a chat address.
///
/// Identifiers that already carry a domain (`local@domain`) keep it and only
/// have the local part reduced to digits. Anything else is reduced to digits
/// and addressed as a direct user chat. Never fails: an identifier without
/// digits yields an empty local part.
pub fn normalize(identifier: &str) -> String {
    match identifier.split_once('@') {
        Some((local, domain)) => format!("{}@{domain}", digits(local)),
        None => format!("{}@{DEFAULT_USER_DOMAIN}", digits(identifier)),
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
