use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored per-weekday working hours of one employee.
///
/// `day_of_week` follows the storage convention 0 = Sunday … 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeWorkday {
    pub employee_id: Uuid,
    pub day_of_week: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
}

impl EmployeeWorkday {
    pub fn weekday(&self) -> Option<Weekday> {
        match self.day_of_week {
            0 => Some(Weekday::Sun),
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            _ => None,
        }
    }

    pub fn break_window(&self) -> Option<BreakWindow> {
        match (self.break_start, self.break_end) {
            (Some(start), Some(end)) if start < end => Some(BreakWindow { start, end }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BreakWindow {
    /// Half-open: a session may start exactly when the break ends.
    pub fn contains(&self, at: NaiveTime) -> bool {
        self.start <= at && at < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkdaySchedule {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub break_window: Option<BreakWindow>,
}

impl WorkdaySchedule {
    pub fn is_on_break(&self, at: NaiveTime) -> bool {
        self.break_window.is_some_and(|window| window.contains(at))
    }

    /// Whether a session [start, end) fits inside the working hours.
    pub fn covers(&self, start: NaiveTime, end: NaiveTime) -> bool {
        start >= self.start && end <= self.end && start < end
    }
}

/// The weekly schedule of one employee. Days without an entry are days off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSchedule {
    pub employee_id: Uuid,
    pub days: Vec<WorkdaySchedule>,
}

impl WorkSchedule {
    pub fn new(employee_id: Uuid) -> Self {
        Self { employee_id, days: Vec::new() }
    }

    pub fn with_day(mut self, day: WorkdaySchedule) -> Self {
        self.days.retain(|existing| existing.weekday != day.weekday);
        self.days.push(day);
        self
    }

    pub fn for_weekday(&self, weekday: Weekday) -> Option<&WorkdaySchedule> {
        self.days.iter().find(|day| day.weekday == weekday)
    }

    /// Builds a schedule from stored rows, skipping rows with an unknown weekday.
    pub fn from_rows(employee_id: Uuid, rows: Vec<EmployeeWorkday>) -> Self {
        rows.into_iter().fold(Self::new(employee_id), |schedule, row| match row.weekday() {
            Some(weekday) => schedule.with_day(WorkdaySchedule {
                weekday,
                start: row.start_time,
                end: row.end_time,
                break_window: row.break_window(),
            }),
            None => {
                tracing::warn!(
                    "Ignoring workday row with invalid day_of_week {} for employee {}",
                    row.day_of_week, employee_id
                );
                schedule
            }
        })
    }
}
