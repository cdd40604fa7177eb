use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DailyTrigger, ScheduleError};

/// Where daily triggers are kept.
pub trait TriggerRegistry: Debug + Send + Sync {
    fn triggers(&self) -> Result<Vec<DailyTrigger>, ScheduleError>;
    /// Returns `false` when no trigger had that id.
    fn delete(&self, id: &str) -> Result<bool, ScheduleError>;
    fn create(&self, job: &str, hour: u32, minute: u32) -> Result<DailyTrigger, ScheduleError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    triggers: Vec<DailyTrigger>,
}

/// Triggers stored as pretty-printed JSON. A missing file is an empty registry.
#[derive(Debug, Clone)]
pub struct JsonTriggerRegistry {
    path: PathBuf,
}

impl JsonTriggerRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RegistryFile, ScheduleError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                return Ok(RegistryFile::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_slice(&bytes).map_err(|source| ScheduleError::Json {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn write(&self, file: &RegistryFile) -> Result<(), ScheduleError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let json = serde_json::to_string_pretty(file).map_err(|source| ScheduleError::Json {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| self.io_error(source))?;
        debug!(path = %self.path.display(), triggers = file.triggers.len(), "trigger registry saved");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> ScheduleError {
        ScheduleError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl TriggerRegistry for JsonTriggerRegistry {
    fn triggers(&self) -> Result<Vec<DailyTrigger>, ScheduleError> {
        Ok(self.read()?.triggers)
    }

    fn delete(&self, id: &str) -> Result<bool, ScheduleError> {
        let mut file = self.read()?;
        let before = file.triggers.len();
        file.triggers.retain(|trigger| trigger.id != id);
        if file.triggers.len() == before {
            return Ok(false);
        }
        self.write(&file)?;
        Ok(true)
    }

    fn create(&self, job: &str, hour: u32, minute: u32) -> Result<DailyTrigger, ScheduleError> {
        let mut file = self.read()?;
        let created_at = Utc::now();
        let trigger = DailyTrigger {
            id: format!("{job}-{}", created_at.timestamp_millis()),
            job: job.to_string(),
            hour,
            minute,
            created_at,
        };
        file.triggers.push(trigger.clone());
        self.write(&file)?;
        Ok(trigger)
    }
}
