//! Spreadsheet-style column addressing.
//!
//! Letters map to 0-based indexes: `A` → 0, `Z` → 25, `AA` → 26.

use super::TableError;

/// Parse spreadsheet column letters into a 0-based column index.
pub fn column_index(letters: &str) -> Result<usize, TableError> {
    let letters = letters.trim();
    if letters.is_empty() {
        return Err(TableError::InvalidAddress("empty column address".to_string()));
    }

    let mut index: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(TableError::InvalidAddress(letters.to_string()));
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .ok_or_else(|| TableError::InvalidAddress(letters.to_string()))?;
    }

    Ok(index - 1)
}

/// Format a 0-based column index as spreadsheet column letters.
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
