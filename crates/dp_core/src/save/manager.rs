use std::fs::{remove_file, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::error::SaveError;
use super::format::{decompress_and_deserialize, serialize_and_compress, BuildSave};

const MAX_SLOT: u8 = 9;

/// File-backed build persistence
///
/// Writes go to a temporary file first and are moved into place with
/// `rename`, so an interrupted save never clobbers an existing slot.
pub struct SaveManager {
    base_dir: PathBuf,
}

impl SaveManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Save a build to a numbered slot (1-9)
    pub fn save_to_slot(&self, slot: u8, save: &BuildSave) -> Result<(), SaveError> {
        Self::validate_slot(slot)?;

        let path = self.slot_path(slot);
        self.save_to_path(&path, save)?;

        log::info!("Build saved to slot {}", slot);
        Ok(())
    }

    /// Load a build from a numbered slot (1-9)
    pub fn load_from_slot(&self, slot: u8) -> Result<BuildSave, SaveError> {
        Self::validate_slot(slot)?;

        let path = self.slot_path(slot);
        let save = Self::load_from_path(&path)?;

        log::info!("Build loaded from slot {}", slot);
        Ok(save)
    }

    /// Check if a save slot exists
    pub fn slot_exists(&self, slot: u8) -> bool {
        if Self::validate_slot(slot).is_err() {
            return false;
        }
        self.slot_path(slot).exists()
    }

    /// Delete a save slot
    pub fn delete_slot(&self, slot: u8) -> Result<(), SaveError> {
        Self::validate_slot(slot)?;

        let path = self.slot_path(slot);
        if path.exists() {
            remove_file(&path)?;
            log::info!("Deleted save slot {}", slot);
        }

        Ok(())
    }

    fn save_to_path(&self, path: &Path, save: &BuildSave) -> Result<(), SaveError> {
        let bytes = serialize_and_compress(save)?;

        std::fs::create_dir_all(&self.base_dir)?;

        // Write to a temp file, then move into place
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        rename(&temp_path, path)?;

        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<BuildSave, SaveError> {
        if !path.exists() {
            return Err(SaveError::FileNotFound { path: path.display().to_string() });
        }

        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;

        decompress_and_deserialize(&bytes)
    }

    fn slot_path(&self, slot: u8) -> PathBuf {
        self.base_dir.join(format!("build_slot_{}.sav", slot))
    }

    fn validate_slot(slot: u8) -> Result<(), SaveError> {
        if slot == 0 || slot > MAX_SLOT {
            return Err(SaveError::InvalidSlot { slot: slot as i64 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_save() -> BuildSave {
        let mut save = BuildSave::new();
        save.main_slots[0].disc_id = Some("main_x".to_string());
        save.main_slots[0].tier = 2;
        save
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SaveManager::new(dir.path());

        manager.save_to_slot(1, &sample_save()).unwrap();
        assert!(manager.slot_exists(1));

        let loaded = manager.load_from_slot(1).unwrap();
        assert_eq!(loaded.main_slots[0].disc_id.as_deref(), Some("main_x"));
        assert_eq!(loaded.main_slots[0].tier, 2);
    }

    #[test]
    fn test_invalid_slot_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SaveManager::new(dir.path());

        assert!(matches!(manager.save_to_slot(0, &sample_save()), Err(SaveError::InvalidSlot { .. })));
        assert!(matches!(manager.load_from_slot(10), Err(SaveError::InvalidSlot { .. })));
        assert!(!manager.slot_exists(0));
    }

    #[test]
    fn test_missing_slot_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SaveManager::new(dir.path());

        assert!(matches!(manager.load_from_slot(3), Err(SaveError::FileNotFound { .. })));
    }

    #[test]
    fn test_delete_slot() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SaveManager::new(dir.path());

        manager.save_to_slot(2, &sample_save()).unwrap();
        manager.delete_slot(2).unwrap();
        assert!(!manager.slot_exists(2));

        // Deleting an empty slot is not an error
        manager.delete_slot(2).unwrap();
    }

    #[test]
    fn test_corrupted_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SaveManager::new(dir.path());

        manager.save_to_slot(4, &sample_save()).unwrap();

        // Flip a byte in the middle of the file
        let path = dir.path().join("build_slot_4.sav");
        let mut bytes = std::fs::read(&path).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] = bytes[mid].wrapping_add(1);
        std::fs::write(&path, bytes).unwrap();

        assert!(manager.load_from_slot(4).is_err());
    }
}
