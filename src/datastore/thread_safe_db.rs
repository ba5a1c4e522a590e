use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::datastore::{LoadSummary, Result, RosterError, RosterStore, StudentRecord};

/// A thread-safe handle to a `RosterStore`.
///
/// Every operation takes the one `Mutex` for its whole duration, so no two
/// callers ever observe or mutate the roster at the same time. Cloning the
/// handle shares the same roster.
#[derive(Clone)]
pub struct ThreadSafeRoster {
    store: Arc<Mutex<RosterStore>>,
}

impl ThreadSafeRoster {
    /// Creates an empty roster bound to the given backing file.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            store: Arc::new(Mutex::new(RosterStore::new(path))),
        }
    }

    // A poisoned lock means another thread panicked mid-operation; surface it
    // instead of handing out a possibly half-updated roster.
    fn lock(&self) -> Result<MutexGuard<'_, RosterStore>> {
        self.store.lock().map_err(|_| RosterError::LockPoisoned)
    }

    pub fn add(&self, record: StudentRecord) -> Result<()> {
        self.lock()?.add(record)
    }

    pub fn delete_by_name(&self, name: &str) -> Result<StudentRecord> {
        self.lock()?.delete_by_name(name)
    }

    pub fn update(&self, roll_number: i32, record: StudentRecord) -> Result<()> {
        self.lock()?.update(roll_number, record)
    }

    pub fn find_by_name(&self, name: &str) -> Result<StudentRecord> {
        self.lock()?.find_by_name(name)
    }

    pub fn find_by_roll(&self, roll_number: i32) -> Result<StudentRecord> {
        self.lock()?.find_by_roll(roll_number)
    }

    pub fn list_all(&self) -> Result<Vec<StudentRecord>> {
        Ok(self.lock()?.list_all())
    }

    pub fn list_by_marks_desc(&self) -> Result<Vec<StudentRecord>> {
        Ok(self.lock()?.list_by_marks_desc())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Loads the backing file. The lock is held for the whole read.
    pub fn load(&self) -> Result<LoadSummary> {
        self.lock()?.load()
    }

    /// Rewrites the backing file from the current roster.
    pub fn save(&self) -> Result<()> {
        self.lock()?.save()
    }
}
