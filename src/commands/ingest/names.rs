use anyhow::{Context, Result};
use regex::Regex;

/// Turns USDA description cells into display names.
pub struct NameNormalizer {
    meatless: Regex,
    trailing_raw: Regex,
    trailing_fresh: Regex,
    trailing_dried: Regex,
    unspecified: Regex,
    raw_footnote: Regex,
}

impl NameNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            meatless: compile(r"(?i)^'([^']+)',\s*meatless$")?,
            trailing_raw: compile(r"(?i),\s*raw\s*$")?,
            trailing_fresh: compile(r"(?i),\s*fresh\s*$")?,
            trailing_dried: compile(r"(?i),\s*dried\s*$")?,
            unspecified: compile(
                r"(?i)\s+\((?:unspecified|no further specified|not further specified)\)\s*$",
            )?,
            // Footnote digits are glued onto "raw", e.g. "Chicken, raw6" or
            // "Oysterraw2". A bare trailing "raw" must start a word.
            raw_footnote: compile(r"(?i),?\s*(?:raw\d+|\braw)$")?,
        })
    }

    pub fn clean(&self, raw: &str) -> String {
        let quotes_normalized: String = raw.chars().map(normalize_quote).collect();
        let unquoted = strip_one_double_quote(&quotes_normalized);

        let mut cleaned = if self.meatless.is_match(unquoted) {
            self.meatless
                .replace(unquoted, "$1 (Meatless)")
                .into_owned()
        } else {
            unquoted.to_string()
        };

        cleaned = cleaned
            .trim_start_matches('\'')
            .trim_end_matches('\'')
            .to_string();
        cleaned = self.trailing_raw.replace(&cleaned, "").into_owned();
        cleaned = self.trailing_fresh.replace(&cleaned, "").into_owned();
        cleaned = self.trailing_dried.replace(&cleaned, " (dried)").into_owned();
        cleaned = self.unspecified.replace(&cleaned, "").into_owned();
        cleaned = self.raw_footnote.replace(&cleaned, "").into_owned();

        capitalize_words(cleaned.trim())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("failed to compile name regex: {pattern}"))
}

fn normalize_quote(ch: char) -> char {
    match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
        other => other,
    }
}

pub fn strip_one_double_quote(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Upper-cases the first letter of each space-separated word. A word opening
/// with `(` or `'` has the letter after the punctuation capitalized instead.
pub fn capitalize_words(value: &str) -> String {
    value
        .split(' ')
        .map(|word| match word.chars().next() {
            Some(open @ ('(' | '\'')) => {
                let mut out = String::with_capacity(word.len());
                out.push(open);
                out.push_str(&capitalize_first(&word[open.len_utf8()..]));
                out
            }
            _ => capitalize_first(word),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
