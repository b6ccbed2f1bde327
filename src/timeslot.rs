//! Time-slot parsing and operational-day ordering.
//!
//! Source headers look like `5시30분` (5 hours 30 minutes). They are turned
//! into a [`TimeSlot`], which renders as an `HH:MM` label and yields an
//! ordering key where the slots just past midnight sort after the last slots
//! of the evening.

use std::fmt;

/// Hour marker in a time-column header.
const HOUR_MARKER: char = '시';
/// Minute marker in a time-column header.
const MINUTE_MARKER: char = '분';
/// Hour value substituted for `00` when ordering, so `00:30` follows `23:30`.
pub const MIDNIGHT_HOUR: u32 = 24;
/// Largest hour accepted in a header or label.
const MAX_HOUR: u32 = MIDNIGHT_HOUR;
/// Largest minute accepted in a header or label.
const MAX_MINUTE: u32 = 59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    hour: u32,
    minute: u32,
}

impl TimeSlot {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Parses a header such as `5시30분` or ` 23시 0분 `.
    ///
    /// The hour marker becomes the separator and the minute marker is dropped,
    /// so `7시` (no minute part) and `7시30분15초` both fail. Returns `None`
    /// unless the header splits into exactly two integer parts.
    pub fn parse_header(header: &str) -> Option<Self> {
        let cleaned: String = header
            .chars()
            .filter(|c| *c != MINUTE_MARKER)
            .map(|c| if c == HOUR_MARKER { ':' } else { c })
            .collect();
        Self::parse_label(cleaned.trim())
    }

    /// Parses an `H:M` or `HH:MM` label.
    ///
    /// Hours above 24 and minutes above 59 are rejected.
    pub fn parse_label(label: &str) -> Option<Self> {
        let mut parts = label.split(':');
        let hour = parts.next()?.trim().parse().ok()?;
        let minute = parts.next()?.trim().parse().ok()?;
        if parts.next().is_some() || hour > MAX_HOUR || minute > MAX_MINUTE {
            return None;
        }
        Some(Self { hour, minute })
    }

    /// The `HH:MM` label, zero padded.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Minute-of-day used for sorting and range checks.
    pub fn order(&self) -> u32 {
        let hour = if self.hour == 0 {
            MIDNIGHT_HOUR
        } else {
            self.hour
        };
        hour * 60 + self.minute
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
