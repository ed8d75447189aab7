use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::enums::DayOfWeek;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub day_of_week: DayOfWeek,
    #[schema(value_type = String, example = "09:00:00")]
    pub open_time: NaiveTime,
    #[schema(value_type = String, example = "18:00:00")]
    pub close_time: NaiveTime,
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("{0} is listed more than once")]
    Duplicate(DayOfWeek),
    #[error("{0} is missing")]
    Missing(DayOfWeek),
    #[error("{0} closes before it opens")]
    ClosesBeforeOpening(DayOfWeek),
}

/// Working hours keyed by day, exactly one entry per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DayHours>", into = "Vec<DayHours>")]
pub struct WeeklySchedule {
    days: BTreeMap<DayOfWeek, DayHours>,
}

impl WeeklySchedule {
    pub fn new(entries: Vec<DayHours>) -> Result<Self, ScheduleError> {
        let mut days = BTreeMap::new();
        for entry in entries {
            if entry.is_open && entry.close_time <= entry.open_time {
                return Err(ScheduleError::ClosesBeforeOpening(entry.day_of_week));
            }
            let day = entry.day_of_week;
            if days.insert(day, entry).is_some() {
                return Err(ScheduleError::Duplicate(day));
            }
        }
        if let Some(missing) = DayOfWeek::ALL.into_iter().find(|d| !days.contains_key(d)) {
            return Err(ScheduleError::Missing(missing));
        }
        Ok(Self { days })
    }

    pub fn get(&self, day: DayOfWeek) -> Option<&DayHours> {
        self.days.get(&day)
    }

    pub fn is_open_at(&self, day: DayOfWeek, time: NaiveTime) -> bool {
        self.get(day)
            .is_some_and(|h| h.is_open && h.open_time <= time && time < h.close_time)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayHours> {
        self.days.values()
    }
}

impl TryFrom<Vec<DayHours>> for WeeklySchedule {
    type Error = ScheduleError;

    fn try_from(entries: Vec<DayHours>) -> Result<Self, Self::Error> {
        WeeklySchedule::new(entries)
    }
}

impl From<WeeklySchedule> for Vec<DayHours> {
    fn from(schedule: WeeklySchedule) -> Self {
        schedule.days.into_values().collect()
    }
}
