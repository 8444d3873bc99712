//! Key Pattern Module
//!
//! Glob-style key matching with the same rules as the remote store's `KEYS`:
//! `*` any run, `?` one char, `[abc]`, `[a-z]`, `[^abc]`, and `\` escapes.

use std::iter::Peekable;
use std::str::Chars;

use regex::Regex;

use crate::error::{Result, StoreError};

// == Key Pattern ==
/// A compiled glob pattern over cache keys.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    regex: Regex,
}

impl KeyPattern {
    /// Compiles a glob pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&glob_to_regex(pattern))
            .map_err(|e| StoreError::InvalidPattern(format!("{pattern}: {e}")))?;
        Ok(Self { regex })
    }

    /// Returns true if the whole key matches.
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

fn escape(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("(?s)^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => out.push_str(&escape(escaped)),
                None => out.push_str(&escape('\\')),
            },
            '[' => out.push_str(&class_to_regex(&mut chars)),
            _ => out.push_str(&escape(c)),
        }
    }

    out.push('$');
    out
}

/// Translates a bracket class; the opening `[` is already consumed.
/// An unterminated class runs to the end of the pattern.
fn class_to_regex(chars: &mut Peekable<Chars<'_>>) -> String {
    let negated = chars.next_if_eq(&'^').is_some();
    let mut ranges: Vec<(char, char)> = Vec::new();

    while let Some(c) = chars.next() {
        let lo = match c {
            ']' => break,
            '\\' => match chars.next() {
                Some(escaped) => escaped,
                None => break,
            },
            _ => c,
        };

        let mut lookahead = chars.clone();
        let is_range = lookahead.next() == Some('-')
            && lookahead.peek().is_some_and(|next| *next != ']');
        if !is_range {
            ranges.push((lo, lo));
            continue;
        }

        chars.next();
        let hi = match chars.next() {
            Some('\\') => chars.next().unwrap_or('\\'),
            Some(hi) => hi,
            None => lo,
        };
        ranges.push((lo.min(hi), lo.max(hi)));
    }

    if ranges.is_empty() {
        // `[]` never matches, `[^]` matches any single char
        return if negated { ".".to_string() } else { r"\z.".to_string() };
    }

    let mut class = String::from(if negated { "[^" } else { "[" });
    for (lo, hi) in ranges {
        class.push_str(&escape(lo));
        if lo != hi {
            class.push('-');
            class.push_str(&escape(hi));
        }
    }
    class.push(']');
    class
}
