//! Parsing of `env` output.

use std::collections::HashMap;

/// Parse raw `env` output.
///
/// Output that is not valid UTF-8 yields an empty map.
pub fn parse_env_output(bytes: &[u8]) -> HashMap<String, String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_env_text(text),
        Err(_) => HashMap::new(),
    }
}

/// Parse `KEY=VALUE` lines into a map.
///
/// Each line is split on `=` with empty pieces dropped; only lines that
/// leave exactly two pieces are kept. Keys and values are trimmed of
/// surrounding whitespace, and a later line overwrites an earlier one
/// with the same key.
///
/// # Example
///
/// ```
/// use loginenv::environment::parse_env_text;
///
/// let env = parse_env_text("A=1\nB = 2 \nMALFORMED\nA=3\n");
/// assert_eq!(env.len(), 2);
/// assert_eq!(env["A"], "3");
/// assert_eq!(env["B"], "2");
/// ```
pub fn parse_env_text(text: &str) -> HashMap<String, String> {
    let mut env = HashMap::new();

    for line in text.lines() {
        let mut pieces = line.split('=').filter(|piece| !piece.is_empty());
        let (Some(key), Some(value), None) = (pieces.next(), pieces.next(), pieces.next()) else {
            continue;
        };

        env.insert(key.trim().to_string(), value.trim().to_string());
    }

    env
}
