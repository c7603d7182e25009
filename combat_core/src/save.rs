//! Save snapshots - Versioned, lightly obfuscated JSON of a character

use crate::character::Character;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Snapshot format version written by this build
pub const SAVE_VERSION: u32 = 1;

/// Letter shift applied to the JSON text
const SHIFT: u8 = 3;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to read or write save file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported save version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Everything a save file holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub version: u32,
    /// Seconds since the Unix epoch when the snapshot was taken
    pub timestamp: u64,
    pub character: Character,
}

impl SaveSnapshot {
    pub fn new(character: Character) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        SaveSnapshot {
            version: SAVE_VERSION,
            timestamp,
            character,
        }
    }
}

fn shift_letters(text: &str, shift: u8) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_lowercase() {
                (((c as u8 - b'a' + shift) % 26) + b'a') as char
            } else if c.is_ascii_uppercase() {
                (((c as u8 - b'A' + shift) % 26) + b'A') as char
            } else {
                c
            }
        })
        .collect()
}

/// Serialize a character into save text
pub fn encode_snapshot(character: &Character) -> Result<String, SaveError> {
    let snapshot = SaveSnapshot::new(character.clone());
    let json = serde_json::to_string(&snapshot)?;
    Ok(shift_letters(&json, SHIFT))
}

/// Parse save text back into a snapshot; the character's stats are
/// recomputed before it is returned
pub fn decode_snapshot(data: &str) -> Result<SaveSnapshot, SaveError> {
    let json = shift_letters(data.trim(), 26 - SHIFT);
    let mut snapshot: SaveSnapshot = serde_json::from_str(&json)?;
    if snapshot.version > SAVE_VERSION {
        return Err(SaveError::UnsupportedVersion {
            found: snapshot.version,
            supported: SAVE_VERSION,
        });
    }
    let repaired = snapshot.character.sanitize_items();
    if repaired > 0 {
        tracing::warn!(items = repaired, "save contained out-of-range items, repaired");
    }
    snapshot.character.recompute();
    Ok(snapshot)
}

pub fn save_to_path(path: &Path, character: &Character) -> Result<(), SaveError> {
    let data = encode_snapshot(character)?;
    fs::write(path, data)?;
    tracing::info!(path = %path.display(), character = %character.name, "saved game");
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<SaveSnapshot, SaveError> {
    let data = fs::read_to_string(path)?;
    let snapshot = decode_snapshot(&data)?;
    tracing::info!(path = %path.display(), character = %snapshot.character.name, "loaded game");
    Ok(snapshot)
}
