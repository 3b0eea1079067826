//! Training records and their MessagePack persistence.
//!
//! One `GameRecord` per game, one file per record. Structs are serialized
//! with named fields so downstream consumers read maps, not tuples.

use gambit_core::{GambitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// One recorded ply of a self-play game.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrainingExample {
    /// Encoded position before the move was played.
    pub encoding: Vec<f32>,

    /// Search visit distribution as a sparse map: policy index to
    /// probability. Sums to 1 over the legal moves.
    pub policy: HashMap<u16, f32>,

    /// Final game outcome from the perspective of the side to move here:
    /// +1 went on to win, -1 to lose, 0 drew.
    pub value: f32,

    /// Ply number within the game, 0-based.
    pub ply: u32,
}

/// A completed self-play game.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GameRecord {
    /// Examples in move order.
    pub examples: Vec<TrainingExample>,

    /// Outcome from White's perspective: +1, -1, or 0.
    pub outcome: f32,

    /// Free-form provenance (seed, ply count, ...).
    pub metadata: HashMap<String, serde_json::Value>,
}

impl GameRecord {
    /// Number of recorded plies.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// Write a record to `path` as named-field MessagePack.
pub fn write_record(path: &Path, record: &GameRecord) -> Result<()> {
    let file = File::create(path).map_err(|e| GambitError::Serialization(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    rmp_serde::encode::write_named(&mut writer, record)
        .map_err(|e| GambitError::Serialization(e.to_string()))
}

/// Read a record written by `write_record`.
pub fn read_record(path: &Path) -> Result<GameRecord> {
    let file = File::open(path).map_err(|e| GambitError::Serialization(e.to_string()))?;
    rmp_serde::decode::from_read(BufReader::new(file))
        .map_err(|e| GambitError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> GameRecord {
        let mut policy = HashMap::new();
        policy.insert(260u16, 0.75f32);
        policy.insert(130u16, 0.25f32);

        let mut metadata = HashMap::new();
        metadata.insert("seed".to_string(), json!(42));
        metadata.insert("plies".to_string(), json!(1));

        GameRecord {
            examples: vec![TrainingExample {
                encoding: vec![0.0, 1.0, 0.5],
                policy,
                value: -1.0,
                ply: 0,
            }],
            outcome: 1.0,
            metadata,
        }
    }

    #[test]
    fn test_record_round_trip() {
        let record = sample_record();
        let path = std::env::temp_dir().join(format!("gambit-record-{}.msgpack", std::process::id()));

        write_record(&path, &record).unwrap();
        let loaded = read_record(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, record);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.metadata.get("seed"), Some(&json!(42)));
    }

    #[test]
    fn test_read_missing_file_is_a_serialization_error() {
        let path = std::env::temp_dir().join("gambit-record-does-not-exist.msgpack");
        assert!(matches!(
            read_record(&path),
            Err(GambitError::Serialization(_))
        ));
    }
}
