use crate::dataset::CrowdingRecord;

/// Rounds to one decimal place for display.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Running max/min/mean and argmax-time over a group of records.
///
/// On a tied maximum the earliest `time_order` wins, whatever order the
/// records arrive in.
#[derive(Debug, Clone)]
pub(crate) struct Accumulator {
    pub(crate) count: usize,
    pub(crate) sum: f64,
    pub(crate) max: f64,
    pub(crate) min: f64,
    pub(crate) peak_time: String,
    peak_order: u32,
}

impl Accumulator {
    pub(crate) fn new(first: &CrowdingRecord) -> Self {
        Self {
            count: 1,
            sum: first.crowding,
            max: first.crowding,
            min: first.crowding,
            peak_time: first.time_label.clone(),
            peak_order: first.time_order,
        }
    }

    pub(crate) fn push(&mut self, record: &CrowdingRecord) {
        self.count += 1;
        self.sum += record.crowding;
        self.min = self.min.min(record.crowding);

        let higher = record.crowding > self.max;
        let earlier_tie = record.crowding == self.max && record.time_order < self.peak_order;
        if higher || earlier_tie {
            self.max = record.crowding;
            self.peak_time = record.time_label.clone();
            self.peak_order = record.time_order;
        }
    }

    pub(crate) fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}
