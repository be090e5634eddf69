use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, IoContext, Result};

/// Run settings, read from an optional JSON file. Every field has a
/// default so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cleared and refilled on every successful run.
    pub output_root: PathBuf,
    /// Network share holding one folder of source programs per workday.
    pub source_root: Option<PathBuf>,
    /// `strftime` pattern of the per-day folder names under `source_root`.
    pub source_date_format: String,
    /// Put each program into a `Machine N - Ø.. - ..` folder.
    pub folder_labels: bool,
    /// Location of the machine profile store.
    pub store_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            source_root: None,
            source_date_format: "%Y-%m-%d".into(),
            folder_labels: true,
            store_path: PathBuf::from("machines.json"),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).io_context("read config", path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Folder of the previous workday under `source_root`, if one is set.
    pub fn default_source_dir(&self, today: NaiveDate) -> Result<Option<PathBuf>> {
        let Some(root) = &self.source_root else {
            return Ok(None);
        };
        let day = previous_workday(today);

        let mut name = String::new();
        write!(name, "{}", day.format(&self.source_date_format))
            .map_err(|_| Error::Config(format!("bad date format `{}`", self.source_date_format)))?;
        Ok(Some(root.join(name)))
    }
}

/// Yesterday, except that Sunday and Monday both go back to Friday.
pub fn previous_workday(today: NaiveDate) -> NaiveDate {
    let back = match today.weekday() {
        Weekday::Mon => 3,
        Weekday::Sun => 2,
        _ => 1,
    };
    today - Days::new(back)
}
