//! Profile persistence with file locking.
//!
//! Profiles are stored in a single JSON object keyed by user id. Saving a
//! profile replaces the user's previous one wholesale.

use crate::{Error, Profile, Result, UserId};
use fs2::FileExt;
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Keyed profile storage
pub trait ProfileStore {
    fn load(&self, user: UserId) -> Result<Option<Profile>>;

    /// Store `profile`, replacing any previous one for `user`
    fn save(&mut self, user: UserId, profile: &Profile) -> Result<()>;

    /// Forget `user`'s profile; returns whether one existed
    fn remove(&mut self, user: UserId) -> Result<bool>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryProfiles {
    profiles: HashMap<UserId, Profile>,
}

impl MemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfiles {
    fn load(&self, user: UserId) -> Result<Option<Profile>> {
        Ok(self.profiles.get(&user).cloned())
    }

    fn save(&mut self, user: UserId, profile: &Profile) -> Result<()> {
        self.profiles.insert(user, profile.clone());
        Ok(())
    }

    fn remove(&mut self, user: UserId) -> Result<bool> {
        Ok(self.profiles.remove(&user).is_some())
    }
}

type ProfileMap = BTreeMap<UserId, Profile>;

/// All profiles in one JSON file, replaced atomically on every save
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file under a shared lock
    ///
    /// A missing file holds no profiles. A file that cannot be parsed is an
    /// error; it is never silently replaced.
    fn read_all(&self) -> Result<ProfileMap> {
        if !self.path.exists() {
            return Ok(ProfileMap::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        if contents.trim().is_empty() {
            return Ok(ProfileMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            Error::State(format!(
                "Profile file {:?} is unreadable: {}",
                self.path, e
            ))
        })
    }

    /// `profiles.json.lock` next to the data file
    ///
    /// The data file itself is replaced on every write, so writers
    /// serialize on this one instead.
    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Read, modify and write back the file under one exclusive lock
    ///
    /// `change` returns whether it modified the map; nothing is written
    /// otherwise.
    fn update<F>(&self, change: F) -> Result<bool>
    where
        F: FnOnce(&mut ProfileMap) -> bool,
    {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)?;
        lock.lock_exclusive()?;

        let result = self.read_all().and_then(|mut profiles| {
            let changed = change(&mut profiles);
            if changed {
                self.write_all(&profiles)?;
            }
            Ok(changed)
        });

        lock.unlock()?;
        result
    }

    /// Atomically replace the file with `profiles`
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// it over the original.
    fn write_all(&self, profiles: &ProfileMap) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(profiles)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} profiles to {:?}", profiles.len(), self.path);
        Ok(())
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self, user: UserId) -> Result<Option<Profile>> {
        Ok(self.read_all()?.remove(&user))
    }

    fn save(&mut self, user: UserId, profile: &Profile) -> Result<()> {
        self.update(|profiles| {
            profiles.insert(user, profile.clone());
            true
        })?;
        tracing::info!("Saved profile for user {}", user);
        Ok(())
    }

    fn remove(&mut self, user: UserId) -> Result<bool> {
        let existed = self.update(|profiles| profiles.remove(&user).is_some())?;
        if existed {
            tracing::info!("Removed profile for user {}", user);
        }
        Ok(existed)
    }
}
