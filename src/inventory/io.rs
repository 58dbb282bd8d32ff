//! Reading and writing inventory directories.
//!
//! An inventory directory holds three files:
//!
//! - `phone.txt` and `phoneme.txt`: one symbol per line, optionally followed
//!   by an explicit index
//! - `allophone.txt`: one phoneme per line followed by the phones realizing
//!   it, whitespace separated

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use log::info;

use super::{Inventory, SymbolTable};
use crate::error::{PhoneticError, Result};
use crate::feature::FeatureTable;
use crate::resource::read_resource;

/// Phone table file name.
pub const PHONE_FILE: &str = "phone.txt";
/// Phoneme table file name.
pub const PHONEME_FILE: &str = "phoneme.txt";
/// Allophone relation file name.
pub const ALLOPHONE_FILE: &str = "allophone.txt";

/// Parse `allophone.txt` content into `(phoneme, phones)` pairs.
pub fn parse_allophones(text: &str) -> Vec<(String, Vec<String>)> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let phoneme = fields.next()?;
            Some((phoneme.to_string(), fields.map(str::to_string).collect()))
        })
        .collect()
}

/// Load the inventory stored in `dir`.
///
/// # Errors
///
/// `ResourceUnavailable` if the directory or one of its three files is
/// missing, `InventoryInconsistent` if the allophone file references a
/// symbol absent from the tables.
pub fn read_inventory<P: AsRef<Path>>(
    dir: P,
    lang_id: &str,
    features: Arc<FeatureTable>,
) -> Result<Inventory> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(PhoneticError::ResourceUnavailable {
            path: dir.to_path_buf(),
            reason: format!("no inventory directory for {lang_id}"),
        });
    }

    let phone = SymbolTable::read(dir.join(PHONE_FILE))?;
    let phoneme = SymbolTable::read(dir.join(PHONEME_FILE))?;
    let allophones = parse_allophones(&read_resource(&dir.join(ALLOPHONE_FILE))?);

    let inventory = Inventory::new(lang_id, phone, phoneme, allophones, features)?;
    info!("loaded {} from {}", inventory, dir.display());
    Ok(inventory)
}

/// Write `inventory` to `dir` in the layout [`read_inventory`] expects,
/// creating the directory if needed.
pub fn write_inventory<P: AsRef<Path>>(inventory: &Inventory, dir: P) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| PhoneticError::io(dir, e))?;

    inventory.phone().write(dir.join(PHONE_FILE))?;
    inventory.phoneme().write(dir.join(PHONEME_FILE))?;

    let path = dir.join(ALLOPHONE_FILE);
    let mut file = fs::File::create(&path).map_err(|e| PhoneticError::io(&path, e))?;
    for phoneme in inventory.phoneme().units() {
        let mut line = phoneme.to_string();
        for phone in inventory.phones_of(phoneme) {
            line.push(' ');
            line.push_str(phone);
        }
        writeln!(file, "{line}").map_err(|e| PhoneticError::io(&path, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allophones() {
        let parsed = parse_allophones("p p pʰ\n\nt t\nə\n");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].0, "p");
        assert_eq!(parsed[0].1, vec!["p", "pʰ"]);
        assert!(parsed[2].1.is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let err = read_inventory("/nonexistent/allophony/xyz", "xyz", FeatureTable::shared())
            .unwrap_err();
        assert!(matches!(err, PhoneticError::ResourceUnavailable { .. }));
    }
}
