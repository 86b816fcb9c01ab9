use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeWindowError {
    #[error("time window '{0}' must look like HH:MM-HH:MM")]
    Format(String),

    #[error("time window '{0}' must start before it ends")]
    Empty(String),
}

/// A recurring daily bookable window, e.g. `09:00-10:00`.
///
/// Windows are parsed once when a doctor record is ingested. A window is an
/// atomic slot identified by its start time; it is never subdivided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TimeWindowError> {
        if start >= end {
            return Err(TimeWindowError::Empty(format!(
                "{}-{}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

impl FromStr for TimeWindow {
    type Err = TimeWindowError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (start, end) = raw
            .split_once('-')
            .ok_or_else(|| TimeWindowError::Format(raw.to_string()))?;

        let parse = |part: &str| {
            NaiveTime::parse_from_str(part.trim(), "%H:%M")
                .map_err(|_| TimeWindowError::Format(raw.to_string()))
        };

        TimeWindow::new(parse(start)?, parse(end)?)
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = TimeWindowError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: String,
    /// Declared windows in the order the doctor listed them.
    pub available_times: Vec<TimeWindow>,
}

/// Doctor fields as written by the registry; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub available_times: Vec<TimeWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}
