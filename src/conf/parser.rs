use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{ConfValue, FlatConfig, Number};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Line parser: configuration text → FlatConfig
// ---------------------------------------------------------------------------

/// Numeric literal grammar: optional sign, digits, optional decimal point,
/// optional exponent. Deliberately a literal grammar, not an expression
/// grammar — file content is never evaluated.
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("number regex"));

/// Cap on tokens per line. Anything beyond the cap stays glued to the last
/// token, so an over-long line fails the number grammar instead of being
/// silently truncated.
const MAX_TOKENS: usize = 10;

/// Parse the full text of a trace configuration file.
///
/// One `KEY value [value ...]` pair per line; values are separated by
/// whitespace or by commas not adjacent to a digit. Lines that are blank
/// or do not start with a letter are ignored. Keys containing `FILTER` or
/// `SENS` never reach the result. A key that repeats keeps its last value.
pub fn parse_str(text: &str) -> Result<FlatConfig, ConfigError> {
    let mut content = FlatConfig::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !line.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            continue; // comment or other non-key line
        }

        let tokens = split_tokens(line, MAX_TOKENS);
        let key = tokens[0];

        let value = if tokens.len() == 2 {
            if NUMBER.is_match(tokens[1]) {
                ConfValue::Scalar(parse_number(key, tokens[1])?)
            } else {
                // String-valued entries keep an empty value list; the keys
                // that actually carry strings are dropped below anyway.
                ConfValue::List(Vec::new())
            }
        } else {
            let mut vals = Vec::with_capacity(tokens.len().saturating_sub(1));
            for tok in &tokens[1..] {
                if !NUMBER.is_match(tok) {
                    return Err(ConfigError::MalformedValue {
                        key: key.to_string(),
                        token: tok.to_string(),
                    });
                }
                vals.push(parse_number(key, tok)?);
            }
            ConfValue::List(vals)
        };

        let upper = key.to_ascii_uppercase();
        if upper.contains("FILTER") || upper.contains("SENS") {
            continue;
        }

        log::debug!("setting {key} = {value}");
        content.insert(key.to_string(), value);
    }

    Ok(content)
}

/// Read and parse a configuration file from disk.
pub fn parse_file(path: &Path) -> Result<FlatConfig, ConfigError> {
    log::info!("reading {}", path.display());
    let bytes = std::fs::read(path).map_err(|source| ConfigError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| {
        ConfigError::InvalidInput(format!("{} is not a text file", path.display()))
    })?;
    parse_str(&text)
}

/// Split a stripped line on separator runs: one or more whitespace
/// characters, or a single comma with no digit on either side (so decimal
/// and grouped forms like `1,234` stay one token). At most `max_tokens`
/// tokens come back; the tail of the line is left unsplit in the last one.
fn split_tokens(line: &str, max_tokens: usize) -> Vec<&str> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() && tokens.len() + 1 < max_tokens {
        let (pos, c) = chars[i];
        let sep_len = if c.is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            j - i
        } else if c == ',' {
            let prev_digit = i > 0 && chars[i - 1].1.is_ascii_digit();
            let next_digit = i + 1 < chars.len() && chars[i + 1].1.is_ascii_digit();
            usize::from(!prev_digit && !next_digit)
        } else {
            0
        };

        if sep_len > 0 {
            tokens.push(&line[start..pos]);
            i += sep_len;
            start = chars.get(i).map_or(line.len(), |&(p, _)| p);
        } else {
            i += 1;
        }
    }

    tokens.push(&line[start..]);
    tokens
}

/// Convert a token already vetted by [`NUMBER`] into a [`Number`].
fn parse_number(key: &str, tok: &str) -> Result<Number, ConfigError> {
    let malformed = |_| ConfigError::MalformedValue {
        key: key.to_string(),
        token: tok.to_string(),
    };

    if tok.contains(['.', 'e', 'E']) {
        tok.parse::<f64>().map(Number::Float).map_err(malformed)
    } else {
        match tok.parse::<i64>() {
            Ok(i) => Ok(Number::Int(i)),
            // digit strings past the i64 range fall back to float
            Err(_) => tok.parse::<f64>().map(Number::Float).map_err(malformed),
        }
    }
}
