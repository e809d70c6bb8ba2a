//! Durable, deduplicated attendance store.
//!
//! Whole-document persistence: the document is loaded wholesale, mutated in
//! memory, and saved wholesale. Single writer per process invocation; there
//! is no partial-write path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{AttendanceBlock, Class, StudentId, Students, TimeBlock};

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// The persisted document. Collections are skipped when empty so the TOML
/// emitter never has to place a bare value after a table.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    blocks: Vec<TimeBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attendances: Vec<StoredAttendance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    classes: Vec<Class>,
    #[serde(default, skip_serializing_if = "Students::is_empty")]
    students: Students,
}

/// Attendance entry as persisted: attender ids as a plain list (emitted
/// before the nested block table). Loading folds the list back into a set,
/// deduplicating documents written by older tools.
#[derive(Debug, Serialize, Deserialize)]
struct StoredAttendance {
    attenders: Vec<StudentId>,
    block: TimeBlock,
}

impl From<&AttendanceBlock> for StoredAttendance {
    fn from(att: &AttendanceBlock) -> Self {
        Self {
            attenders: att.attenders.iter().cloned().collect(),
            block: att.block.clone(),
        }
    }
}

impl From<StoredAttendance> for AttendanceBlock {
    fn from(stored: StoredAttendance) -> Self {
        Self {
            block: stored.block,
            attenders: stored.attenders.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Aggregate root owning all persisted entities.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    pub blocks: Vec<TimeBlock>,
    pub attendances: Vec<AttendanceBlock>,
    pub classes: Vec<Class>,
    pub students: Students,
}

impl Store {
    /// Fresh empty store; nothing touches the filesystem until `save`.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            blocks: Vec::new(),
            attendances: Vec::new(),
            classes: Vec::new(),
            students: Students::new(),
        }
    }

    /// Load the persisted document. A missing file is `StoreNotFound` (the
    /// only recoverable load failure); anything else that goes wrong while
    /// reading or parsing is fatal.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::StoreNotFound(path));
            }
            Err(e) => return Err(Error::Io(e.to_string())),
        };

        let doc: StoreDocument =
            toml::from_str(&text).map_err(|e| Error::StoreParse(e.to_string()))?;

        for block in doc.blocks.iter().chain(doc.attendances.iter().map(|a| &a.block)) {
            if block.start > block.end {
                return Err(Error::StoreParse(format!(
                    "block '{}': start {} is after end {}",
                    block.title, block.start, block.end
                )));
            }
        }

        Ok(Self {
            path,
            blocks: doc.blocks,
            attendances: doc.attendances.into_iter().map(Into::into).collect(),
            classes: doc.classes,
            students: doc.students,
        })
    }

    /// Load, degrading to a fresh store when the document does not exist yet.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        match Self::load(&path) {
            Ok(store) => Ok(store),
            Err(Error::StoreNotFound(_)) => Ok(Self::create(path)),
            Err(e) => Err(e),
        }
    }

    /// Serialize the entire state and atomically replace the document:
    /// write a sibling temp file, then rename over the target.
    pub fn save(&self) -> Result<(), Error> {
        let doc = StoreDocument {
            blocks: self.blocks.clone(),
            attendances: self.attendances.iter().map(Into::into).collect(),
            classes: self.classes.clone(),
            students: self.students.clone(),
        };

        let text = toml::to_string(&doc).map_err(|e| Error::Io(e.to_string()))?;

        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, text).map_err(|e| Error::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::Io(e.to_string()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Register a manually created time block. Titles are identities:
    /// a second block under the same title is rejected and the stored one
    /// is left untouched.
    pub fn add_block(&mut self, block: TimeBlock) -> Result<(), Error> {
        if self.blocks.iter().any(|stored| stored.title == block.title) {
            return Err(Error::DuplicateBlock(block.title));
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Merge an attendance import. When a stored attendance shares the new
    /// block's title the attender sets are unioned in place — the stored
    /// block's identity, date, and span are retained — otherwise the import
    /// is appended verbatim. Re-importing the same sheet is a no-op.
    pub fn add_attendances(&mut self, att: AttendanceBlock) {
        match self
            .attendances
            .iter_mut()
            .find(|stored| stored.block.title == att.block.title)
        {
            Some(stored) => stored.attenders.extend(att.attenders),
            None => self.attendances.push(att),
        }
    }

    /// Upsert id → name pairs; last write wins.
    pub fn add_students(&mut self, students: Students) {
        self.students.extend(students);
    }

    /// Cache a class fetched from the roster provider. The cache is never
    /// updated in place: re-adding under an existing key is a conflict even
    /// when the roster has changed since it was cached.
    pub fn add_class(&mut self, class: Class) -> Result<(), Error> {
        if self.classes.iter().any(|stored| stored.key() == class.key()) {
            return Err(Error::DuplicateClass {
                subject_id: class.subject_id,
                class_id: class.class_id,
                semester: class.semester,
            });
        }
        self.classes.push(class);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// The students mapping restricted to `ids`; unknown ids are dropped.
    pub fn students_with_ids<'a, I>(&self, ids: I) -> Students
    where
        I: IntoIterator<Item = &'a StudentId>,
    {
        ids.into_iter()
            .filter_map(|id| self.students.get(id).map(|name| (id.clone(), name.clone())))
            .collect()
    }

    /// Linear key search through the cached classes.
    pub fn load_class(
        &self,
        subject_id: &str,
        class_id: &str,
        semester: &str,
    ) -> Result<&Class, Error> {
        self.classes
            .iter()
            .find(|class| class.key() == (subject_id, class_id, semester))
            .ok_or_else(|| Error::ClassNotFound {
                subject_id: subject_id.to_string(),
                class_id: class_id.to_string(),
                semester: semester.to_string(),
            })
    }
}
