//! Daily trigger bookkeeping for the scan job.
//!
//! Triggers fire once per day at a local wall-clock time. The registry keeps
//! them; [`ScheduleManager`] makes sure exactly one is registered.

mod registry;

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use registry::{JsonTriggerRegistry, TriggerRegistry};

/// Name of the job the runner registers.
pub const DAILY_SCAN_JOB: &str = "daily-scan";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTrigger {
    pub id: String,
    pub job: String,
    pub hour: u32,
    pub minute: u32,
    pub created_at: DateTime<Utc>,
}

impl DailyTrigger {
    pub fn time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }

    /// First firing strictly after `now` (local wall-clock time).
    pub fn next_fire_after(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let time = self.time()?;
        let today = now.date().and_time(time);
        if today > now {
            Some(today)
        } else {
            Some(today + Duration::days(1))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("{hour:02}:{minute:02} is not a valid time of day")]
    InvalidTime { hour: u32, minute: u32 },
    #[error("trigger registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("trigger registry {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Keeps a single daily trigger registered for a job.
#[derive(Debug)]
pub struct ScheduleManager<R> {
    registry: R,
}

impl<R> ScheduleManager<R>
where
    R: TriggerRegistry,
{
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Remove every registered trigger, then register one for `job`.
    /// Running it twice leaves the same single trigger in place.
    pub fn ensure_daily_schedule(
        &self,
        job: &str,
        hour: u32,
        minute: u32,
    ) -> Result<DailyTrigger, ScheduleError> {
        if NaiveTime::from_hms_opt(hour, minute, 0).is_none() {
            return Err(ScheduleError::InvalidTime { hour, minute });
        }

        let removed = self.clear()?;
        let trigger = self.registry.create(job, hour, minute)?;
        info!(
            job,
            id = %trigger.id,
            hour,
            minute,
            replaced = removed,
            "daily trigger installed"
        );
        Ok(trigger)
    }

    /// Returns how many triggers were removed.
    pub fn clear(&self) -> Result<usize, ScheduleError> {
        let mut removed = 0;
        for trigger in self.registry.triggers()? {
            if self.registry.delete(&trigger.id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn triggers(&self) -> Result<Vec<DailyTrigger>, ScheduleError> {
        self.registry.triggers()
    }

    /// Earliest upcoming firing across all triggers.
    pub fn next_due(
        &self,
        now: NaiveDateTime,
    ) -> Result<Option<(DailyTrigger, NaiveDateTime)>, ScheduleError> {
        let next = self
            .registry
            .triggers()?
            .into_iter()
            .filter_map(|trigger| {
                let at = trigger.next_fire_after(now)?;
                Some((trigger, at))
            })
            .min_by_key(|(_, at)| *at);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid datetime")
    }

    fn trigger(id: &str, hour: u32, minute: u32) -> DailyTrigger {
        DailyTrigger {
            id: id.to_string(),
            job: DAILY_SCAN_JOB.to_string(),
            hour,
            minute,
            created_at: Utc::now(),
        }
    }

    #[derive(Debug, Default)]
    struct MemoryRegistry {
        triggers: Mutex<Vec<DailyTrigger>>,
    }

    impl TriggerRegistry for MemoryRegistry {
        fn triggers(&self) -> Result<Vec<DailyTrigger>, ScheduleError> {
            Ok(self.triggers.lock().expect("registry mutex").clone())
        }

        fn delete(&self, id: &str) -> Result<bool, ScheduleError> {
            let mut triggers = self.triggers.lock().expect("registry mutex");
            let before = triggers.len();
            triggers.retain(|trigger| trigger.id != id);
            Ok(triggers.len() != before)
        }

        fn create(&self, job: &str, hour: u32, minute: u32) -> Result<DailyTrigger, ScheduleError> {
            let mut triggers = self.triggers.lock().expect("registry mutex");
            let mut created = trigger(&format!("t{}", triggers.len() + 1), hour, minute);
            created.job = job.to_string();
            triggers.push(created.clone());
            Ok(created)
        }
    }

    #[test]
    fn fires_later_today_or_tomorrow() {
        let nine = trigger("a", 9, 0);
        assert_eq!(
            nine.next_fire_after(at(2024, 3, 1, 8, 59)),
            Some(at(2024, 3, 1, 9, 0))
        );
        assert_eq!(
            nine.next_fire_after(at(2024, 3, 1, 9, 0)),
            Some(at(2024, 3, 2, 9, 0))
        );
        assert_eq!(
            nine.next_fire_after(at(2024, 12, 31, 23, 0)),
            Some(at(2025, 1, 1, 9, 0))
        );
        assert_eq!(trigger("b", 25, 0).next_fire_after(at(2024, 3, 1, 0, 0)), None);
    }

    #[test]
    fn ensure_replaces_existing_triggers() {
        let registry = MemoryRegistry::default();
        registry
            .triggers
            .lock()
            .expect("registry mutex")
            .extend([trigger("old-1", 7, 0), trigger("old-2", 21, 30)]);
        let manager = ScheduleManager::new(registry);

        let installed = manager
            .ensure_daily_schedule(DAILY_SCAN_JOB, 9, 15)
            .expect("installs");
        let again = manager
            .ensure_daily_schedule(DAILY_SCAN_JOB, 9, 15)
            .expect("installs again");

        let triggers = manager.triggers().expect("lists");
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0], again);
        assert_eq!((installed.hour, installed.minute), (9, 15));
    }

    #[test]
    fn rejects_impossible_times_without_touching_registry() {
        let registry = MemoryRegistry::default();
        registry
            .triggers
            .lock()
            .expect("registry mutex")
            .push(trigger("keep", 9, 0));
        let manager = ScheduleManager::new(registry);

        let err = manager
            .ensure_daily_schedule(DAILY_SCAN_JOB, 9, 60)
            .expect_err("minute out of range");
        assert!(matches!(err, ScheduleError::InvalidTime { hour: 9, minute: 60 }));
        assert_eq!(manager.triggers().expect("lists").len(), 1);
    }

    #[test]
    fn clear_reports_removed_count() {
        let manager = ScheduleManager::new(MemoryRegistry::default());
        assert_eq!(manager.clear().expect("clears"), 0);
        manager
            .ensure_daily_schedule(DAILY_SCAN_JOB, 6, 0)
            .expect("installs");
        assert_eq!(manager.clear().expect("clears"), 1);
        assert!(manager.triggers().expect("lists").is_empty());
    }

    #[test]
    fn next_due_picks_the_earliest_trigger() {
        let registry = MemoryRegistry::default();
        registry
            .triggers
            .lock()
            .expect("registry mutex")
            .extend([trigger("late", 18, 0), trigger("early", 7, 30)]);
        let manager = ScheduleManager::new(registry);

        let (next, when) = manager
            .next_due(at(2024, 3, 1, 12, 0))
            .expect("lists")
            .expect("has a trigger");
        assert_eq!(next.id, "late");
        assert_eq!(when, at(2024, 3, 1, 18, 0));

        let none = ScheduleManager::new(MemoryRegistry::default())
            .next_due(at(2024, 3, 1, 12, 0))
            .expect("lists");
        assert!(none.is_none());
    }
}
