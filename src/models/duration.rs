//! Duration value object shared by the timeout and stream forms

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl DurationUnit {
    pub fn seconds(self) -> u64 {
        match self {
            DurationUnit::Seconds => 1,
            DurationUnit::Minutes => 60,
            DurationUnit::Hours => 60 * 60,
            DurationUnit::Days => 24 * 60 * 60,
        }
    }

    /// Singular and plural labels
    fn labels(self) -> (&'static str, &'static str) {
        match self {
            DurationUnit::Seconds => ("second", "seconds"),
            DurationUnit::Minutes => ("minute", "minutes"),
            DurationUnit::Hours => ("hour", "hours"),
            DurationUnit::Days => ("day", "days"),
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.labels().1)
    }
}

impl FromStr for DurationUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(DurationUnit::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(DurationUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(DurationUnit::Hours),
            "d" | "day" | "days" => Ok(DurationUnit::Days),
            other => Err(format!("Unknown duration unit '{}'. Use seconds, minutes, hours or days", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub value: u32,
    pub unit: DurationUnit,
}

impl Duration {
    pub fn new(value: u32, unit: DurationUnit) -> Self {
        Duration { value, unit }
    }

    pub fn as_seconds(&self) -> u64 {
        self.value as u64 * self.unit.seconds()
    }

    pub fn as_minutes(&self) -> f64 {
        self.as_seconds() as f64 / 60.0
    }

    /// "1 hour" / "3 hours"
    pub fn pluralized(&self) -> String {
        let (one, many) = self.unit.labels();
        if self.value == 1 {
            format!("1 {}", one)
        } else {
            format!("{} {}", self.value, many)
        }
    }

    /// Helper line under the duration input, hidden for a zero value
    pub fn helper_text(&self) -> Option<String> {
        if self.value == 0 {
            None
        } else {
            Some(format_seconds(self.as_seconds()))
        }
    }
}

/// Render a number of seconds using the two largest buckets.
///
/// Whole buckets drop the remainder and keep the plural label, so
/// exactly 3600 seconds renders as "1 hours".
pub fn format_seconds(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{} seconds", seconds);
    }
    if seconds < 3600 {
        let mins = seconds / 60;
        let secs = seconds % 60;
        return if secs > 0 {
            format!("{} min {} sec", mins, secs)
        } else {
            format!("{} minutes", mins)
        };
    }
    if seconds < 86_400 {
        let hrs = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        return if mins > 0 {
            format!("{} hr {} min", hrs, mins)
        } else {
            format!("{} hours", hrs)
        };
    }
    let days = seconds / 86_400;
    let hrs = (seconds % 86_400) / 3600;
    if hrs > 0 {
        format!("{} day {} hr", days, hrs)
    } else {
        format!("{} days", days)
    }
}
