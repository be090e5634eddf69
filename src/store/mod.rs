//! Machine profile settings store.
//!
//! Profiles are keyed by machine number, which is unique. The pipeline
//! only reads from the store; the `machine` CLI commands edit it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, IoContext, Result};
use crate::model::MachineProfile;

pub trait ProfileStore {
    fn create(&mut self, profile: MachineProfile) -> Result<()>;

    fn get(&self, machine_number: u32) -> Result<Option<MachineProfile>>;

    /// All profiles ordered by machine number.
    fn list(&self) -> Result<Vec<MachineProfile>>;

    fn update(&mut self, profile: MachineProfile) -> Result<()>;

    fn delete(&mut self, machine_number: u32) -> Result<()>;
}

/// Volatile store, handy for tests and one-off runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profiles: BTreeMap<u32, MachineProfile>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = MachineProfile>) -> Result<Self> {
        let mut store = Self::new();
        for p in profiles {
            store.create(p)?;
        }
        Ok(store)
    }
}

impl ProfileStore for MemoryProfileStore {
    fn create(&mut self, profile: MachineProfile) -> Result<()> {
        if self.profiles.contains_key(&profile.machine_number) {
            return Err(Error::DuplicateMachine(profile.machine_number));
        }
        self.profiles.insert(profile.machine_number, profile);
        Ok(())
    }

    fn get(&self, machine_number: u32) -> Result<Option<MachineProfile>> {
        Ok(self.profiles.get(&machine_number).cloned())
    }

    fn list(&self) -> Result<Vec<MachineProfile>> {
        Ok(self.profiles.values().cloned().collect())
    }

    fn update(&mut self, profile: MachineProfile) -> Result<()> {
        match self.profiles.get_mut(&profile.machine_number) {
            Some(slot) => {
                *slot = profile;
                Ok(())
            }
            None => Err(Error::UnknownMachine(profile.machine_number)),
        }
    }

    fn delete(&mut self, machine_number: u32) -> Result<()> {
        self.profiles
            .remove(&machine_number)
            .map(|_| ())
            .ok_or(Error::UnknownMachine(machine_number))
    }
}

/// Store persisted as a JSON array of profiles.
///
/// The whole file is read on open and rewritten after every change.
#[derive(Debug)]
pub struct JsonProfileStore {
    path: PathBuf,
    inner: MemoryProfileStore,
}

impl JsonProfileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let json = fs::read_to_string(&path).io_context("read settings store", &path)?;
            let profiles: Vec<MachineProfile> = serde_json::from_str(&json)?;
            debug!(path = %path.display(), count = profiles.len(), "settings store loaded");
            MemoryProfileStore::with_profiles(profiles)?
        } else {
            MemoryProfileStore::new()
        };
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy and keep it only once it is on disk.
    fn commit(&mut self, change: impl FnOnce(&mut MemoryProfileStore) -> Result<()>) -> Result<()> {
        let mut next = self.inner.clone();
        change(&mut next)?;
        self.save(&next)?;
        self.inner = next;
        Ok(())
    }

    fn save(&self, store: &MemoryProfileStore) -> Result<()> {
        let profiles = store.list()?;
        let json = serde_json::to_string_pretty(&profiles)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).io_context("create directory", parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).io_context("write settings store", &tmp)?;
        fs::rename(&tmp, &self.path).io_context("replace settings store", &self.path)?;
        Ok(())
    }
}

impl ProfileStore for JsonProfileStore {
    fn create(&mut self, profile: MachineProfile) -> Result<()> {
        self.commit(|store| store.create(profile))
    }

    fn get(&self, machine_number: u32) -> Result<Option<MachineProfile>> {
        self.inner.get(machine_number)
    }

    fn list(&self) -> Result<Vec<MachineProfile>> {
        self.inner.list()
    }

    fn update(&mut self, profile: MachineProfile) -> Result<()> {
        self.commit(|store| store.update(profile))
    }

    fn delete(&mut self, machine_number: u32) -> Result<()> {
        self.commit(|store| store.delete(machine_number))
    }
}
