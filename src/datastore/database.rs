use super::{Result, RosterError, StudentRecord};
use std::{
    collections::HashMap,
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Outcome of reading the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    /// Lines decoded into records.
    pub loaded: usize,
    /// Lines that failed to decode and were dropped.
    pub skipped: usize,
}

/// The roster itself.
/// It holds every record in memory, keyed by roll number, and the path of the
/// flat file it is persisted to.
pub struct RosterStore {
    path: PathBuf,
    records: HashMap<i32, StudentRecord>,
}

impl RosterStore {
    /// Creates an empty roster bound to a backing file. Nothing is read until
    /// `load` is called.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        RosterStore {
            path: path.as_ref().to_path_buf(),
            records: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts a new record. Fails without touching the roster if the roll
    /// number is already taken.
    pub fn add(&mut self, record: StudentRecord) -> Result<()> {
        let roll_number = record.roll_number();
        if self.records.contains_key(&roll_number) {
            return Err(RosterError::DuplicateKey(roll_number));
        }
        self.records.insert(roll_number, record);
        debug!(roll_number, "student added");
        Ok(())
    }

    /// Removes exactly one record whose name matches, ignoring case. Which one
    /// goes when several students share a name is unspecified.
    pub fn delete_by_name(&mut self, name: &str) -> Result<StudentRecord> {
        let roll_number = self
            .records
            .values()
            .find(|record| record.has_name(name))
            .map(StudentRecord::roll_number)
            .ok_or_else(|| RosterError::NotFound(format!("name {}", name)))?;
        let removed = self
            .records
            .remove(&roll_number)
            .ok_or_else(|| RosterError::NotFound(format!("roll number {}", roll_number)))?;
        debug!(roll_number, "student deleted");
        Ok(removed)
    }

    /// Replaces the record stored under `roll_number` wholesale. The new
    /// record is re-keyed to `roll_number` so the stored record always carries
    /// its own key.
    pub fn update(&mut self, roll_number: i32, record: StudentRecord) -> Result<()> {
        let slot = self
            .records
            .get_mut(&roll_number)
            .ok_or_else(|| RosterError::NotFound(format!("roll number {}", roll_number)))?;
        if record.roll_number() != roll_number {
            debug!(
                roll_number,
                supplied = record.roll_number(),
                "replacement record re-keyed to target roll number"
            );
        }
        *slot = record.with_roll_number(roll_number);
        debug!(roll_number, "student updated");
        Ok(())
    }

    /// Returns the first record whose name matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Result<StudentRecord> {
        self.records
            .values()
            .find(|record| record.has_name(name))
            .cloned()
            .ok_or_else(|| RosterError::NotFound(format!("name {}", name)))
    }

    pub fn find_by_roll(&self, roll_number: i32) -> Result<StudentRecord> {
        self.records
            .get(&roll_number)
            .cloned()
            .ok_or_else(|| RosterError::NotFound(format!("roll number {}", roll_number)))
    }

    /// Snapshot of every record, in no particular order.
    pub fn list_all(&self) -> Vec<StudentRecord> {
        self.records.values().cloned().collect()
    }

    /// Snapshot of every record, highest marks first.
    pub fn list_by_marks_desc(&self) -> Vec<StudentRecord> {
        let mut records = self.list_all();
        records.sort_by(|a, b| b.marks().total_cmp(&a.marks()));
        records
    }

    /// Reads the backing file into the roster.
    ///
    /// A missing file is created empty. Lines that do not decode, including
    /// lines that are not valid UTF-8, are skipped and counted rather than
    /// reported as errors; only I/O faults fail the load, and then the roster
    /// is left as it was. Decoded records are inserted over whatever the
    /// roster already holds, and a later line wins over an earlier one with
    /// the same roll number.
    pub fn load(&mut self) -> Result<LoadSummary> {
        if !self.path.exists() {
            File::create(&self.path)?;
            info!(path = %self.path.display(), "backing file created");
            return Ok(LoadSummary::default());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut decoded = Vec::new();
        let mut summary = LoadSummary::default();
        for (index, bytes) in reader.split(b'\n').enumerate() {
            let mut bytes = bytes?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            let record = std::str::from_utf8(&bytes)
                .map_err(|e| RosterError::invalid("line", e.to_string()))
                .and_then(StudentRecord::from_line);
            match record {
                Ok(record) => {
                    decoded.push(record);
                    summary.loaded += 1;
                }
                Err(e) => {
                    warn!(line = index + 1, error = %e, "skipping malformed record");
                    summary.skipped += 1;
                }
            }
        }

        self.records.extend(decoded.into_iter().map(|r| (r.roll_number(), r)));
        info!(
            path = %self.path.display(),
            loaded = summary.loaded,
            skipped = summary.skipped,
            "roster loaded"
        );
        Ok(summary)
    }

    /// Writes the whole roster to the backing file, replacing its contents.
    ///
    /// Records go to a sibling temporary file first, which is then renamed
    /// over the backing file, so a failed write leaves the previous contents
    /// in place. The temporary file is removed if anything fails.
    pub fn save(&self) -> Result<()> {
        let staging = self.staging_path();
        if let Err(e) = self.write_staged(&staging) {
            if let Err(cleanup) = fs::remove_file(&staging) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(
                        path = %staging.display(),
                        error = %cleanup,
                        "failed to remove staging file"
                    );
                }
            }
            return Err(e);
        }
        info!(path = %self.path.display(), records = self.records.len(), "roster saved");
        Ok(())
    }

    fn write_staged(&self, staging: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(staging)?;
        let mut writer = BufWriter::new(file);
        for record in self.records.values() {
            writeln!(writer, "{}", record.to_line())?;
        }
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        fs::rename(staging, &self.path)?;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
