//! Slot storage backends.
//!
//! A slot store is a flat string-to-string map, the shape of a browser's
//! local storage. The cache keeps a value and its timestamp in two separate
//! slots so freshness can be checked without decoding the value.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{Error, Result};

/// Trait for slot storage backends.
///
/// Implementations must be usable from any task; the cache shares one store
/// between every view that reads it.
pub trait SlotStore: Send + Sync {
    /// Read a slot. `Ok(None)` if it was never written or has been removed.
    fn get(&self, slot: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous contents.
    fn set(&self, slot: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing a missing slot is not an error.
    fn remove(&self, slot: &str) -> Result<()>;

    /// Write a value slot and its timestamp slot.
    ///
    /// Readers must never see the new value paired with the old timestamp.
    /// The default clears the timestamp, writes the value, then writes the
    /// timestamp; readers treat a missing timestamp as an absent entry.
    /// Stores that can write both slots as one unit should override this.
    fn set_pair(&self, value_slot: &str, value: &str, stamp_slot: &str, stamp: &str) -> Result<()> {
        self.remove(stamp_slot)?;
        self.set(value_slot, value)?;
        self.set(stamp_slot, stamp)
    }

    /// Read a value slot together with its timestamp slot.
    ///
    /// `Ok(None)` unless both are present and belong to the same write. The
    /// default reads the timestamp, the value, then the timestamp again; a
    /// write landing in between changes or clears the timestamp, and the
    /// pair is reported absent rather than mismatched.
    fn get_pair(&self, value_slot: &str, stamp_slot: &str) -> Result<Option<(String, String)>> {
        let Some(stamp) = self.get(stamp_slot)? else {
            return Ok(None);
        };
        let Some(value) = self.get(value_slot)? else {
            return Ok(None);
        };
        if self.get(stamp_slot)?.as_deref() != Some(stamp.as_str()) {
            trace!(value_slot, "slot pair changed during read");
            return Ok(None);
        }
        Ok(Some((value, stamp)))
    }

    /// Remove a value slot and its timestamp slot, timestamp first.
    fn remove_pair(&self, value_slot: &str, stamp_slot: &str) -> Result<()> {
        let stamp = self.remove(stamp_slot);
        let value = self.remove(value_slot);
        stamp.and(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────────────────────────────────────

/// In-process slot store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn get(&self, slot: &str) -> Result<Option<String>> {
        Ok(self.slots.lock().get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> Result<()> {
        self.slots.lock().insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        self.slots.lock().remove(slot);
        Ok(())
    }

    fn set_pair(&self, value_slot: &str, value: &str, stamp_slot: &str, stamp: &str) -> Result<()> {
        let mut slots = self.slots.lock();
        slots.insert(value_slot.to_string(), value.to_string());
        slots.insert(stamp_slot.to_string(), stamp.to_string());
        Ok(())
    }

    fn get_pair(&self, value_slot: &str, stamp_slot: &str) -> Result<Option<(String, String)>> {
        let slots = self.slots.lock();
        Ok(slots
            .get(value_slot)
            .zip(slots.get(stamp_slot))
            .map(|(value, stamp)| (value.clone(), stamp.clone())))
    }

    fn remove_pair(&self, value_slot: &str, stamp_slot: &str) -> Result<()> {
        let mut slots = self.slots.lock();
        slots.remove(stamp_slot);
        slots.remove(value_slot);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FileStore
// ─────────────────────────────────────────────────────────────────────────────

/// File-backed slot store: one file per slot inside a directory.
///
/// Each slot write goes through a temporary file and a rename, so a single
/// slot is never observed half-written. The pair write relies on the
/// trait's clear-then-write ordering.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf> {
        let valid = !slot.is_empty()
            && !slot.starts_with('.')
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(Error::InvalidSlot(slot.to_string()));
        }
        Ok(self.dir.join(slot))
    }

    fn io_err(slot: &str) -> impl FnOnce(std::io::Error) -> Error + '_ {
        move |source| Error::Io {
            slot: slot.to_string(),
            source,
        }
    }
}

impl SlotStore for FileStore {
    fn get(&self, slot: &str) -> Result<Option<String>> {
        let path = self.slot_path(slot)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                trace!(slot, path = %path.display(), "slot read");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(slot)(e)),
        }
    }

    fn set(&self, slot: &str, value: &str) -> Result<()> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.dir).map_err(Self::io_err(slot))?;

        let tmp = self.dir.join(format!(".{}.tmp", slot));
        fs::write(&tmp, value).map_err(Self::io_err(slot))?;
        fs::rename(&tmp, &path).map_err(Self::io_err(slot))?;

        trace!(slot, path = %path.display(), bytes = value.len(), "slot written");
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(slot)(e)),
        }
    }
}
