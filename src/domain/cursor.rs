//! Day cursor over the loaded price series.
//!
//! Every operation clamps into `[0, last_index]`; over-paging at either end
//! is silently absorbed.

use tracing::debug;

pub const DEFAULT_START_DAY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCursor {
    current_day: usize,
    last_index: usize,
    start_day: usize,
}

impl DayCursor {
    pub fn new(last_index: usize, start_day: usize) -> Self {
        DayCursor {
            current_day: start_day.min(last_index),
            last_index,
            start_day,
        }
    }

    pub fn current_day(&self) -> usize {
        self.current_day
    }

    pub fn last_index(&self) -> usize {
        self.last_index
    }

    pub fn advance(&mut self, n: usize) -> usize {
        self.current_day = self.current_day.saturating_add(n).min(self.last_index);
        debug!(day = self.current_day, n, "cursor advanced");
        self.current_day
    }

    pub fn retreat(&mut self, n: usize) -> usize {
        self.current_day = self.current_day.saturating_sub(n);
        debug!(day = self.current_day, n, "cursor retreated");
        self.current_day
    }

    pub fn seek(&mut self, day: usize) -> usize {
        self.current_day = day.min(self.last_index);
        debug!(day = self.current_day, requested = day, "cursor moved");
        self.current_day
    }

    pub fn reset(&mut self) -> usize {
        self.current_day = self.start_day.min(self.last_index);
        self.current_day
    }
}
