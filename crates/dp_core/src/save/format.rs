use std::collections::{HashMap, HashSet};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use super::error::SaveError;
use super::SAVE_VERSION;
use crate::data::{GROWTH_PHASE_MAX, MAIN_TIER_MAX};
use crate::disc::loadout::{DiscLoadout, MAIN_SLOT_COUNT, SUB_SLOT_COUNT};

/// Saved main-slot state
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MainSlotSave {
    pub disc_id: Option<String>,
    pub tier: u8,
}

impl Default for MainSlotSave {
    fn default() -> Self {
        Self { disc_id: None, tier: 1 }
    }
}

/// Saved sub-slot state
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SubSlotSave {
    pub disc_id: Option<String>,
    pub growth_phase: u8,
}

/// Minimal persistent build state
///
/// This tuple fully reconstructs the engine: slot assignments with their
/// progression counters, plus the manually declared note extras. Derived
/// values are intentionally absent and recomputed after restore.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BuildSave {
    /// Save format version for migration
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    pub timestamp: u64,

    /// Main slots (3)
    pub main_slots: Vec<MainSlotSave>,

    /// Sub slots (3)
    pub sub_slots: Vec<SubSlotSave>,

    /// Acquired note extras (note type -> extra level, zero entries omitted)
    pub acquired_notes: HashMap<String, u32>,
}

impl Default for BuildSave {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildSave {
    pub fn new() -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp: current_timestamp(),
            main_slots: vec![MainSlotSave::default(); MAIN_SLOT_COUNT],
            sub_slots: vec![SubSlotSave::default(); SUB_SLOT_COUNT],
            acquired_notes: HashMap::new(),
        }
    }

    /// Capture a loadout's persistent state
    pub fn from_loadout(loadout: &DiscLoadout) -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp: current_timestamp(),
            main_slots: loadout
                .main_slots
                .iter()
                .map(|s| MainSlotSave { disc_id: s.disc_id.clone(), tier: s.tier })
                .collect(),
            sub_slots: loadout
                .sub_slots
                .iter()
                .map(|s| SubSlotSave { disc_id: s.disc_id.clone(), growth_phase: s.growth_phase })
                .collect(),
            acquired_notes: loadout
                .acquired_notes
                .iter()
                .filter(|(_, extra)| **extra > 0)
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
        }
    }

    pub fn update_timestamp(&mut self) {
        self.timestamp = current_timestamp();
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.main_slots.len() != MAIN_SLOT_COUNT || self.sub_slots.len() != SUB_SLOT_COUNT {
            return Err(SaveError::Corrupted);
        }

        for slot in &self.main_slots {
            if slot.tier < 1 || slot.tier > MAIN_TIER_MAX {
                return Err(SaveError::Corrupted);
            }
        }
        for slot in &self.sub_slots {
            if slot.growth_phase > GROWTH_PHASE_MAX {
                return Err(SaveError::Corrupted);
            }
        }

        // Check for duplicate disc IDs across the six slots
        let mut disc_ids = HashSet::new();
        let occupied = self
            .main_slots
            .iter()
            .filter_map(|s| s.disc_id.as_deref())
            .chain(self.sub_slots.iter().filter_map(|s| s.disc_id.as_deref()));
        for id in occupied {
            if !disc_ids.insert(id) {
                return Err(SaveError::Corrupted);
            }
        }

        Ok(())
    }
}

/// Serialize and compress build save data
pub fn serialize_and_compress(save: &BuildSave) -> Result<Vec<u8>, SaveError> {
    // Validate before serialization
    save.validate()?;

    // 1. Serialize to MessagePack with field names
    let msgpack = to_vec_named(save).map_err(SaveError::Serialization)?;

    // 2. Compress with LZ4 (size prepended for easy decompression)
    let compressed = compress_prepend_size(&msgpack);

    // 3. Add SHA256 checksum at the end
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Decompress and deserialize build save data
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<BuildSave, SaveError> {
    // Check minimum size (header + checksum)
    if bytes.len() < 4 + 32 {
        return Err(SaveError::Corrupted);
    }

    // Split payload and checksum
    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 32);

    // Verify checksum
    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated_checksum = hasher.finalize();

    if &calculated_checksum[..] != checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    // Decompress
    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;

    // Deserialize
    let save: BuildSave = from_slice(&msgpack).map_err(SaveError::Deserialization)?;

    // Validate version and structure
    if save.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
    }
    save.validate()?;

    Ok(save)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
