//! Current-time provider used when building prompts.
//!
//! The prompt tells the model what time it is, so the orchestrator takes a
//! single snapshot from a [`Clock`] at the start of each query. Tests inject a
//! [`FixedClock`] to keep prompts deterministic.

use chrono::{DateTime, Datelike, Local, TimeZone, Weekday};
use serde::{Deserialize, Serialize};

/// Source of the human-readable current time (`<Weekday> HH:MM`).
pub trait Clock: Send + Sync {
    /// Current day and 24-hour time, e.g. `"Tuesday 14:05"`.
    fn now(&self) -> String;
}

/// Language used for weekday names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayLanguage {
    #[default]
    English,
    Danish,
}

impl WeekdayLanguage {
    /// Parse a language name ("english"/"en", "danish"/"da").
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Some(Self::English),
            "danish" | "da" | "dansk" => Some(Self::Danish),
            _ => None,
        }
    }

    /// Name of the given weekday in this language.
    pub fn weekday_name(&self, weekday: Weekday) -> &'static str {
        match self {
            Self::English => match weekday {
                Weekday::Mon => "Monday",
                Weekday::Tue => "Tuesday",
                Weekday::Wed => "Wednesday",
                Weekday::Thu => "Thursday",
                Weekday::Fri => "Friday",
                Weekday::Sat => "Saturday",
                Weekday::Sun => "Sunday",
            },
            Self::Danish => match weekday {
                Weekday::Mon => "mandag",
                Weekday::Tue => "tirsdag",
                Weekday::Wed => "onsdag",
                Weekday::Thu => "torsdag",
                Weekday::Fri => "fredag",
                Weekday::Sat => "lørdag",
                Weekday::Sun => "søndag",
            },
        }
    }
}

/// Format a timestamp as `<Weekday> HH:MM`.
pub fn format_day_time<Tz: TimeZone>(time: &DateTime<Tz>, language: WeekdayLanguage) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{} {}",
        language.weekday_name(time.weekday()),
        time.format("%H:%M")
    )
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    language: WeekdayLanguage,
}

impl SystemClock {
    pub fn new(language: WeekdayLanguage) -> Self {
        Self { language }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> String {
        format_day_time(&Local::now(), self.language)
    }
}

/// Clock that always reports the same time.
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    pub fn new(time: impl Into<String>) -> Self {
        Self(time.into())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
