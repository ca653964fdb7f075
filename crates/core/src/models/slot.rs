use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::BookingError;

/// Day of the week used as key of a tutor's recurring table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// A time-of-day label such as `14:00`.
///
/// Always rendered zero-padded, and ordered by time rather than by text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(SlotTime)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for SlotTime {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BookingError::Validation(format!("Invalid time label: {:?}", s));
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour = hour.parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.parse::<u32>().map_err(|_| invalid())?;
        SlotTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Recurring weekly slot table of a tutor.
///
/// A weekday that is absent has no availability at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyAvailability(BTreeMap<Weekday, BTreeSet<SlotTime>>);

impl WeeklyAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(weekday, ["HH:MM", ...])` pairs.
    pub fn from_labels<'a, I, T>(days: I) -> Result<Self, BookingError>
    where
        I: IntoIterator<Item = (Weekday, T)>,
        T: IntoIterator<Item = &'a str>,
    {
        let mut table = Self::new();
        for (day, labels) in days {
            let times = labels
                .into_iter()
                .map(str::parse)
                .collect::<Result<BTreeSet<SlotTime>, _>>()?;
            table.set_day(day, times);
        }
        Ok(table)
    }

    pub fn times_for(&self, day: Weekday) -> Option<&BTreeSet<SlotTime>> {
        self.0.get(&day)
    }

    /// Replaces one day. An empty set removes the day.
    pub fn set_day(&mut self, day: Weekday, times: BTreeSet<SlotTime>) {
        if times.is_empty() {
            self.0.remove(&day);
        } else {
            self.0.insert(day, times);
        }
    }

    /// Adds the slot if missing, removes it if present. Returns whether it is now offered.
    pub fn toggle(&mut self, day: Weekday, time: SlotTime) -> bool {
        let times = self.0.entry(day).or_default();
        let offered = if times.remove(&time) {
            false
        } else {
            times.insert(time);
            true
        };
        if times.is_empty() {
            self.0.remove(&day);
        }
        offered
    }

    pub fn days(&self) -> impl Iterator<Item = (&Weekday, &BTreeSet<SlotTime>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
