//! Column roles of the wide source table.
//!
//! The layout is positional: five identifier columns, then one column per
//! time slot. [`TableSchema`] resolves that once so nothing downstream has to
//! re-derive a role from a column index.

use crate::error::LoadError;
use crate::timeslot::TimeSlot;

/// Number of leading identifier columns.
pub const IDENTIFIER_COLUMNS: usize = 5;
/// Identifier columns plus at least one time column.
pub const MIN_COLUMNS: usize = IDENTIFIER_COLUMNS + 1;

/// A time-bucket column and the slot its header parsed to, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeColumn {
    pub index: usize,
    pub header: String,
    pub slot: Option<TimeSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub operator: usize,
    pub line: usize,
    pub station_code: usize,
    pub station_name: usize,
    pub direction: usize,
    pub time_columns: Vec<TimeColumn>,
}

impl TableSchema {
    /// Validates the header row and assigns roles.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Schema`] when there are fewer than [`MIN_COLUMNS`]
    /// headers.
    pub fn from_headers(headers: &[String]) -> Result<Self, LoadError> {
        if headers.len() < MIN_COLUMNS {
            return Err(LoadError::Schema {
                found: headers.len(),
            });
        }

        let time_columns = headers
            .iter()
            .enumerate()
            .skip(IDENTIFIER_COLUMNS)
            .map(|(index, header)| TimeColumn {
                index,
                header: header.clone(),
                slot: TimeSlot::parse_header(header),
            })
            .collect();

        Ok(Self {
            operator: 0,
            line: 1,
            station_code: 2,
            station_name: 3,
            direction: 4,
            time_columns,
        })
    }

    /// Time columns whose header parsed to a slot.
    pub fn valid_time_columns(&self) -> impl Iterator<Item = (&TimeColumn, TimeSlot)> {
        self.time_columns
            .iter()
            .filter_map(|column| column.slot.map(|slot| (column, slot)))
    }

    pub fn skipped_time_columns(&self) -> usize {
        self.time_columns.iter().filter(|c| c.slot.is_none()).count()
    }
}
