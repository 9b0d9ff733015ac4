//! Referral Links
//!
//! Invite links carry the referrer in the query string, either as
//! `?id=0x…` or as a bare `?0x…`.

use std::collections::HashMap;

use goldmine_common::types::Address;

/// Key a bare query item is stored under
pub const ID_KEY: &str = "id";

/// Decode `%XX` escapes; invalid escapes are kept as written
///
/// Returns `None` when the decoded bytes are not UTF-8.
pub fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).ok()
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|v| v as u8)
}

/// Parse a query string (without the leading `?`)
///
/// Empty input and `"0"` give no parameters. The whole string is decoded
/// first, then split on `&` and `=`. A query that does not decode gives
/// no parameters.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if query.is_empty() || query == "0" {
        return params;
    }
    let Some(decoded) = percent_decode(query) else {
        return params;
    };

    for item in decoded.split('&') {
        let mut parts = item.split('=');
        let key = parts.next().unwrap_or_default();
        match parts.next() {
            Some(value) => params.insert(key.to_string(), value.to_string()),
            None => params.insert(ID_KEY.to_string(), key.to_string()),
        };
    }
    params
}

/// Raw `id` carried by the link, if any
pub fn referrer_id(query: &str) -> Option<String> {
    parse_query(query.trim_start_matches('?')).remove(ID_KEY)
}

/// Referrer address carried by the link, if any
pub fn referrer_from_query(query: &str) -> Option<Address> {
    referrer_id(query).and_then(|id| id.parse().ok())
}

/// Referrer field text for an address or an invite link query
///
/// A link's `id` is passed through unparsed so a malformed one is rejected
/// like a malformed address. A link without `id` gives a blank field.
pub fn referrer_input(arg: &str) -> String {
    if arg.contains('=') || arg.starts_with('?') {
        referrer_id(arg).unwrap_or_default()
    } else {
        arg.to_string()
    }
}
