use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::CatalogError;
use crate::model::FoodItem;
use crate::util::write_json_pretty;

/// Sorts by display name and keeps the first item for each lower-cased name.
///
/// The sort is stable, so when two spellings collate equal the item that
/// arrived first (food rows before alcohol rows) wins. Returns the catalog and
/// the number of dropped duplicates.
pub fn sort_and_dedup(mut items: Vec<FoodItem>) -> (Vec<FoodItem>, usize) {
    items.sort_by(|a, b| compare_names(&a.name, &b.name));

    let before = items.len();
    let mut seen = HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.name.to_lowercase()));

    let dropped = before - items.len();
    (items, dropped)
}

/// Locale-style name ordering.
///
/// Primary level: whitespace, then punctuation and symbols, then digits, then
/// letters, with letters compared case- and accent-insensitively. Ties are
/// broken by preferring the unaccented letter, then lowercase, at the first
/// difference, then by code point so the ordering stays total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .map(primary_key)
        .cmp(b.chars().map(primary_key));
    if primary != Ordering::Equal {
        return primary;
    }

    let accents = a
        .chars()
        .map(is_accented)
        .cmp(b.chars().map(is_accented));
    if accents != Ordering::Equal {
        return accents;
    }

    let case = a
        .chars()
        .map(char::is_uppercase)
        .cmp(b.chars().map(char::is_uppercase));
    if case != Ordering::Equal {
        return case;
    }

    a.cmp(b)
}

/// Punctuation and symbols in root collation order. Anything not listed
/// sorts after them by code point, still ahead of digits.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

fn primary_key(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, 0)
    } else if c.is_alphabetic() {
        let base = fold_accent(c);
        (3, u32::from(base.to_lowercase().next().unwrap_or(base)))
    } else if c.is_numeric() {
        (2, u32::from(c))
    } else {
        let rank = match PUNCTUATION_ORDER.chars().position(|p| p == c) {
            Some(index) => index as u32,
            None => PUNCTUATION_ORDER.len() as u32 + u32::from(c),
        };
        (1, rank)
    }
}

fn is_accented(c: char) -> bool {
    fold_accent(c) != c
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' => 'A',
        'ç' | 'č' => 'c',
        'Ç' | 'Č' => 'C',
        'è' | 'é' | 'ê' | 'ë' | 'ē' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' => 'E',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' => 'O',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}

pub fn write_catalog(path: &Path, items: &[FoodItem]) -> Result<()> {
    write_json_pretty(path, items)
        .with_context(|| format!("failed to write catalog: {}", path.display()))
}

pub fn load_catalog(path: &Path) -> Result<Vec<FoodItem>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let items: Vec<FoodItem> = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    validate_catalog(&items).with_context(|| format!("invalid catalog {}", path.display()))?;
    Ok(items)
}

pub fn validate_catalog(items: &[FoodItem]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if !item.level_is_consistent() {
            return Err(CatalogError::InconsistentLevel {
                name: item.name.clone(),
                purines: item.purines.unwrap_or_default(),
                level: item.purine_level.as_str(),
            });
        }
        if !seen.insert(item.name.to_lowercase()) {
            return Err(CatalogError::DuplicateName(item.name.clone()));
        }
    }
    Ok(())
}
