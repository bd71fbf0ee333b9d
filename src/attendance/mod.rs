//! Daily staff attendance roster.
//!
//! A sheet is built from the current staff list and kept locally, one JSON
//! file per date under the config directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::listview::{Column, FieldValue, ListRecord};
use crate::resources::Staff;

#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("No staff member with id {0} on this sheet")]
    UnknownStaff(String),

    #[error("Failed to access attendance file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Attendance file {path} is corrupt: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[default]
    #[serde(rename = "Not Taken")]
    NotTaken,
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::NotTaken => "Not Taken",
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub status: AttendanceStatus,
    pub present: bool,
}

static ENTRY_COLUMNS: &[Column<AttendanceEntry>] = &[
    Column { key: "id", label: "ID", get: |e| FieldValue::text(&e.id) },
    Column { key: "name", label: "Name", get: |e| FieldValue::text(&e.name) },
    Column { key: "status", label: "Status", get: |e| FieldValue::text(e.status.as_str()) },
];

impl ListRecord for AttendanceEntry {
    fn columns() -> &'static [Column<Self>] {
        ENTRY_COLUMNS
    }

    /// The roster is searched by staff name only
    fn search_values(&self) -> Vec<FieldValue> {
        vec![FieldValue::text(&self.name)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSheet {
    pub date: NaiveDate,
    pub entries: Vec<AttendanceEntry>,
}

impl AttendanceSheet {
    /// Fresh sheet with nobody marked yet
    pub fn from_staff(date: NaiveDate, staff: &[Staff]) -> Self {
        let mut sheet = Self { date, entries: Vec::new() };
        sheet.sync_staff(staff);
        sheet
    }

    /// Add staff that joined since the sheet was saved and refresh names.
    /// Marks already taken are kept.
    pub fn sync_staff(&mut self, staff: &[Staff]) {
        for member in staff {
            match self.entries.iter_mut().find(|e| e.id == member.id) {
                Some(entry) => {
                    entry.name = member.name.clone();
                    entry.photo = member.image.clone();
                }
                None => self.entries.push(AttendanceEntry {
                    id: member.id.clone(),
                    name: member.name.clone(),
                    photo: member.image.clone(),
                    status: AttendanceStatus::NotTaken,
                    present: false,
                }),
            }
        }
    }

    /// Flip presence; returns the new value
    pub fn toggle(&mut self, id: &str) -> Result<bool, AttendanceError> {
        let present = !self.entry(id)?.present;
        self.mark(id, present)?;
        Ok(present)
    }

    pub fn mark(&mut self, id: &str, present: bool) -> Result<(), AttendanceError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AttendanceError::UnknownStaff(id.to_string()))?;
        entry.present = present;
        entry.status = if present {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        };
        Ok(())
    }

    fn entry(&self, id: &str) -> Result<&AttendanceEntry, AttendanceError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AttendanceError::UnknownStaff(id.to_string()))
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|e| e.present).count()
    }
}

/// Directory of saved sheets, one `<date>.json` per day
#[derive(Debug, Clone)]
pub struct AttendanceStore {
    dir: PathBuf,
}

impl AttendanceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    pub fn load(&self, date: NaiveDate) -> Result<Option<AttendanceSheet>, AttendanceError> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
        let sheet = serde_json::from_str(&content)
            .map_err(|source| AttendanceError::Corrupt { path: path.clone(), source })?;
        Ok(Some(sheet))
    }

    /// Saved sheet for `date` reconciled with `staff`, or a fresh one
    pub fn open(&self, date: NaiveDate, staff: &[Staff]) -> Result<AttendanceSheet, AttendanceError> {
        Ok(match self.load(date)? {
            Some(mut sheet) => {
                sheet.sync_staff(staff);
                sheet
            }
            None => AttendanceSheet::from_staff(date, staff),
        })
    }

    pub fn save(&self, sheet: &AttendanceSheet) -> Result<PathBuf, AttendanceError> {
        fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))?;
        let path = self.path_for(sheet.date);
        let content = serde_json::to_string_pretty(sheet)
            .map_err(|source| AttendanceError::Corrupt { path: path.clone(), source })?;
        fs::write(&path, content).map_err(|source| io_error(&path, source))?;
        debug!("attendance saved to {}", path.display());
        Ok(path)
    }
}

fn io_error(path: &Path, source: io::Error) -> AttendanceError {
    AttendanceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listview::{derive, SortDirection, SortState};
    use serde_json::json;

    fn staff() -> Vec<Staff> {
        serde_json::from_value(json!([
            { "_id": "1", "name": "Donna Tyson", "email": "d@gym.io", "phone": "1" },
            { "_id": "2", "name": "Bob Marsh", "email": "b@gym.io", "phone": "2" }
        ]))
        .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn new_sheet_is_not_taken() {
        let sheet = AttendanceSheet::from_staff(date(), &staff());
        assert_eq!(sheet.entries.len(), 2);
        assert!(sheet.entries.iter().all(|e| e.status == AttendanceStatus::NotTaken && !e.present));
    }

    #[test]
    fn toggle_flips_presence() {
        let mut sheet = AttendanceSheet::from_staff(date(), &staff());
        assert!(sheet.toggle("2").unwrap());
        assert_eq!(sheet.entries[1].status, AttendanceStatus::Present);
        assert!(!sheet.toggle("2").unwrap());
        assert_eq!(sheet.entries[1].status, AttendanceStatus::Absent);
        assert!(matches!(sheet.toggle("9"), Err(AttendanceError::UnknownStaff(_))));
    }

    #[test]
    fn roster_searches_names_and_sorts_by_status() {
        let mut sheet = AttendanceSheet::from_staff(date(), &staff());
        let hits = derive(&sheet.entries, "DONNA", &SortState::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
        assert_eq!(derive(&sheet.entries, "", &SortState::default()).len(), 2);
        // Status text is not searched
        assert!(derive(&sheet.entries, "taken", &SortState::default()).is_empty());

        sheet.mark("1", false).unwrap();
        sheet.mark("2", true).unwrap();
        let by_status = derive(&sheet.entries, "", &SortState::by("status", SortDirection::Asc));
        let ids: Vec<_> = by_status.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn store_round_trips_and_keeps_marks() {
        let dir = std::env::temp_dir().join(format!("gymdesk-attendance-{}", uuid::Uuid::new_v4()));
        let store = AttendanceStore::new(&dir);

        let mut sheet = store.open(date(), &staff()).unwrap();
        sheet.mark("1", true).unwrap();
        store.save(&sheet).unwrap();

        let mut more = staff();
        more.push(serde_json::from_value(json!({ "_id": "3", "name": "Cy" })).unwrap());
        let reopened = store.open(date(), &more).unwrap();
        assert_eq!(reopened.entries.len(), 3);
        assert!(reopened.entries[0].present);
        assert_eq!(reopened.present_count(), 1);

        let _ = fs::remove_dir_all(dir);
    }
}
