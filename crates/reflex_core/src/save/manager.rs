use super::error::GeometryError;
use super::format::{decode_zone_set, encode_zone_set};
use crate::geometry::ZoneSet;

use std::fs::{remove_file, rename, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Reads and writes the zone record at a fixed path.
#[derive(Debug, Clone)]
pub struct GeometryStore {
    path: PathBuf,
}

impl GeometryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the persisted zones. Missing or malformed records are errors,
    /// never partially filled sets.
    pub fn load(&self) -> Result<ZoneSet, GeometryError> {
        let record = match std::fs::read_to_string(&self.path) {
            Ok(record) => record,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(GeometryError::NotFound { path: self.path.display().to_string() });
            }
            Err(err) => return Err(err.into()),
        };

        let zones = decode_zone_set(&record)?;
        for (zone, rect) in zones.iter() {
            log::info!("Zone {} retrieved: {}", zone, rect);
        }
        Ok(zones)
    }

    /// Overwrite the record with `zones`.
    pub fn save(&self, zones: &ZoneSet) -> Result<(), GeometryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let record = encode_zone_set(zones);

        // Atomic save: write to temp file, then rename
        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(record.as_bytes())?;
            file.flush()?;
            file.sync_all()?;
        }
        rename(&temp_path, &self.path)?;

        log::info!("Wrote zone geometry to {:?}", self.path);
        Ok(())
    }

    /// Delete the record so the next start calibrates again.
    pub fn clear(&self) -> Result<bool, GeometryError> {
        match remove_file(&self.path) {
            Ok(()) => {
                log::info!("Deleted zone geometry at {:?}", self.path);
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
