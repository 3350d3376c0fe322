//! bota-storage-json
//!
//! One pretty-printed JSON file per table under a data directory. Writes go through a
//! temporary file and a rename, serialized by a process-wide lock.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use bota_core::{
    storage::{remove_by_id, upsert},
    CoreError, RecordStore,
};
use bota_domain::{
    AdvancePayment, ForecastItem, ForecastSettings, GigRecord, LedgerMovement, Musician,
    MusicianAssignment,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Gigs,
    Musicians,
    Assignments,
    Movements,
    Advances,
    ForecastItems,
    Settings,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Gigs,
        Table::Musicians,
        Table::Assignments,
        Table::Movements,
        Table::Advances,
        Table::ForecastItems,
        Table::Settings,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            Table::Gigs => "bolos",
            Table::Musicians => "musics",
            Table::Assignments => "bolo_musics",
            Table::Movements => "moviments",
            Table::Advances => "avancaments",
            Table::ForecastItems => "previsio",
            Table::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub data_root: PathBuf,
}

impl StoragePaths {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.data_root.join("tables")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.data_root.join("backups")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_root.join("exports")
    }
}

/// Gigs, movements and advances of one calendar month.
#[derive(Debug, Clone, Serialize, serde::Deserialize, PartialEq)]
pub struct MonthExport {
    pub year: i32,
    pub month: u32,
    pub generated_at: DateTime<Utc>,
    pub gigs: Vec<GigRecord>,
    pub movements: Vec<LedgerMovement>,
    pub advances: Vec<AdvancePayment>,
    pub income_total: f64,
    pub pot_delta_total: f64,
    pub movement_total: f64,
}

pub struct JsonRecordStore {
    paths: StoragePaths,
    retention: usize,
    write_lock: Mutex<()>,
}

impl JsonRecordStore {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(paths.tables_dir())?;
        fs::create_dir_all(paths.backups_dir())?;
        fs::create_dir_all(paths.exports_dir())?;
        Ok(Self {
            paths,
            retention: retention.max(1),
            write_lock: Mutex::new(()),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.paths
            .tables_dir()
            .join(format!("{}.{}", table.file_stem(), FILE_EXTENSION))
    }

    fn read_rows<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>, CoreError> {
        Ok(read_json::<Vec<T>>(&self.table_path(table))?.unwrap_or_default())
    }

    /// Read-modify-write of one table under the write lock.
    fn modify<T, R>(&self, table: Table, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, CoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CoreError::Storage("write lock poisoned".into()))?;
        let mut rows = self.read_rows::<T>(table)?;
        let result = f(&mut rows);
        write_json(&self.table_path(table), &rows)?;
        debug!(table = table.file_stem(), rows = rows.len(), "table written");
        Ok(result)
    }

    /// Copies every existing table file into `backups/<timestamp>[_note]/`.
    pub fn backup(&self, note: Option<&str>) -> Result<String, CoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CoreError::Storage("write lock poisoned".into()))?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let name = match sanitize_note(note) {
            Some(label) => format!("{timestamp}_{label}"),
            None => timestamp,
        };
        let dir = self.paths.backups_dir().join(&name);
        fs::create_dir_all(&dir)?;
        for table in Table::ALL {
            let source = self.table_path(table);
            if source.exists() {
                fs::copy(&source, dir.join(source.file_name().unwrap_or_default()))?;
            }
        }
        info!(backup = %name, "record tables backed up");
        self.prune_backups()?;
        Ok(name)
    }

    /// Backup names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, CoreError> {
        let dir = self.paths.backups_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort_by_key(|name| Reverse(parse_backup_timestamp(name)));
        Ok(names)
    }

    pub fn restore_backup(&self, name: &str) -> Result<(), CoreError> {
        let dir = self.paths.backups_dir().join(name);
        if !dir.is_dir() {
            return Err(CoreError::Storage(format!("backup `{name}` not found")));
        }
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CoreError::Storage("write lock poisoned".into()))?;
        for table in Table::ALL {
            let target = self.table_path(table);
            let source = dir.join(target.file_name().unwrap_or_default());
            if source.exists() {
                fs::copy(&source, &target)?;
            } else if target.exists() {
                fs::remove_file(&target)?;
            }
        }
        info!(backup = %name, "record tables restored");
        Ok(())
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for stale in self.list_backups()?.into_iter().skip(self.retention) {
            fs::remove_dir_all(self.paths.backups_dir().join(stale))?;
        }
        Ok(())
    }

    /// Writes the month's records to `exports/bota_YYYY-MM.json` and returns the path.
    pub fn export_month(&self, year: i32, month: u32) -> Result<PathBuf, CoreError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CoreError::Validation(format!("invalid month {year}-{month}")));
        }
        let in_month = |date: Option<NaiveDate>| {
            date.is_some_and(|date| date.year() == year && date.month() == month)
        };
        let gigs: Vec<GigRecord> = self
            .gigs()?
            .into_iter()
            .filter(|gig| in_month(gig.date))
            .collect();
        let movements: Vec<LedgerMovement> = self
            .movements()?
            .into_iter()
            .filter(|movement| in_month(movement.date))
            .collect();
        let advances: Vec<AdvancePayment> = self
            .advances()?
            .into_iter()
            .filter(|advance| in_month(advance.date))
            .collect();

        let export = MonthExport {
            year,
            month,
            generated_at: Utc::now(),
            income_total: gigs.iter().map(|gig| gig.income_total).sum(),
            pot_delta_total: gigs.iter().filter(|gig| gig.is_closed()).map(|gig| gig.pot_delta).sum(),
            movement_total: movements.iter().map(|movement| movement.amount).sum(),
            gigs,
            movements,
            advances,
        };
        let path = self
            .paths
            .exports_dir()
            .join(format!("bota_{year:04}-{month:02}.{FILE_EXTENSION}"));
        write_json(&path, &export)?;
        info!(path = %path.display(), gigs = export.gigs.len(), "exported month");
        Ok(path)
    }
}

impl RecordStore for JsonRecordStore {
    fn gigs(&self) -> Result<Vec<GigRecord>, CoreError> {
        self.read_rows(Table::Gigs)
    }

    fn save_gig(&self, gig: &GigRecord) -> Result<(), CoreError> {
        self.modify(Table::Gigs, |rows| upsert(rows, gig))
    }

    fn delete_gig(&self, id: Uuid) -> Result<(), CoreError> {
        if self.modify(Table::Gigs, |rows: &mut Vec<GigRecord>| remove_by_id(rows, id))? {
            Ok(())
        } else {
            Err(CoreError::GigNotFound(id))
        }
    }

    fn musicians(&self) -> Result<Vec<Musician>, CoreError> {
        self.read_rows(Table::Musicians)
    }

    fn save_musician(&self, musician: &Musician) -> Result<(), CoreError> {
        self.modify(Table::Musicians, |rows| upsert(rows, musician))
    }

    fn assignments(&self) -> Result<Vec<MusicianAssignment>, CoreError> {
        self.read_rows(Table::Assignments)
    }

    fn save_assignment(&self, assignment: &MusicianAssignment) -> Result<(), CoreError> {
        self.modify(Table::Assignments, |rows| upsert(rows, assignment))
    }

    fn delete_assignment(&self, id: Uuid) -> Result<(), CoreError> {
        if self.modify(Table::Assignments, |rows: &mut Vec<MusicianAssignment>| remove_by_id(rows, id))? {
            Ok(())
        } else {
            Err(CoreError::AssignmentNotFound(id))
        }
    }

    fn movements(&self) -> Result<Vec<LedgerMovement>, CoreError> {
        self.read_rows(Table::Movements)
    }

    fn save_movement(&self, movement: &LedgerMovement) -> Result<(), CoreError> {
        self.modify(Table::Movements, |rows| upsert(rows, movement))
    }

    fn delete_movement(&self, id: Uuid) -> Result<(), CoreError> {
        if self.modify(Table::Movements, |rows: &mut Vec<LedgerMovement>| remove_by_id(rows, id))? {
            Ok(())
        } else {
            Err(CoreError::MovementNotFound(id))
        }
    }

    fn advances(&self) -> Result<Vec<AdvancePayment>, CoreError> {
        self.read_rows(Table::Advances)
    }

    fn save_advance(&self, advance: &AdvancePayment) -> Result<(), CoreError> {
        self.modify(Table::Advances, |rows| upsert(rows, advance))
    }

    fn delete_advance(&self, id: Uuid) -> Result<(), CoreError> {
        if self.modify(Table::Advances, |rows: &mut Vec<AdvancePayment>| remove_by_id(rows, id))? {
            Ok(())
        } else {
            Err(CoreError::AdvanceNotFound(id))
        }
    }

    fn forecast_items(&self) -> Result<Vec<ForecastItem>, CoreError> {
        self.read_rows(Table::ForecastItems)
    }

    fn save_forecast_item(&self, item: &ForecastItem) -> Result<(), CoreError> {
        self.modify(Table::ForecastItems, |rows| upsert(rows, item))
    }

    fn delete_forecast_item(&self, id: Uuid) -> Result<(), CoreError> {
        if self.modify(Table::ForecastItems, |rows: &mut Vec<ForecastItem>| remove_by_id(rows, id))? {
            Ok(())
        } else {
            Err(CoreError::ForecastItemNotFound(id))
        }
    }

    fn settings(&self) -> Result<Option<ForecastSettings>, CoreError> {
        read_json(&self.table_path(Table::Settings))
    }

    fn save_settings(&self, settings: &ForecastSettings) -> Result<(), CoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CoreError::Storage("write lock poisoned".into()))?;
        write_json(&self.table_path(Table::Settings), settings)
    }
}

/// `Ok(None)` when the file does not exist yet.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|err| CoreError::Serde(format!("{}: {err}", path.display())))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json =
        serde_json::to_string_pretty(value).map_err(|err| CoreError::Serde(err.to_string()))?;
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let mut sanitized = String::new();
    for ch in note?.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else if !sanitized.is_empty() && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(name.get(..13)?, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_keeps_the_table_extension() {
        assert_eq!(
            tmp_path(Path::new("/data/bolos.json")),
            PathBuf::from("/data/bolos.json.tmp")
        );
    }

    #[test]
    fn backup_names_sort_by_timestamp() {
        assert!(parse_backup_timestamp("20250301_1200_abans") > parse_backup_timestamp("20250228_2359"));
        assert!(parse_backup_timestamp("misc").is_none());
    }
}
