use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Up,
    Down,
}

/// Live counters of the monitor. All durations are whole seconds.
///
/// Mutated only from inside a tick; ticks are serialized, so no locking.
/// Never persisted — the log file is the durable record, and counters
/// restart from zero on every launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityState {
    pub last_result: Status,
    /// Seconds spent continuously in `last_result`.
    pub current_streak_secs: u64,
    pub total_up_secs: u64,
    pub total_down_secs: u64,
}

impl ConnectivityState {
    /// Fresh state at process start: zero elapsed time counts as fully up,
    /// which also makes the percent-up convention (100 at 0/0) fall out.
    pub fn new() -> Self {
        Self {
            last_result: Status::Up,
            current_streak_secs: 0,
            total_up_secs: 0,
            total_down_secs: 0,
        }
    }

    /// Integer percent of lifetime spent up, truncating. 100 when nothing
    /// has elapsed yet.
    pub fn percent_up(&self) -> u64 {
        let total = self.total_up_secs + self.total_down_secs;
        if total > 0 {
            100 * self.total_up_secs / total
        } else {
            100
        }
    }

    pub fn lifetime_secs(&self) -> u64 {
        self.total_up_secs + self.total_down_secs
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new()
    }
}

/// One line of the uptime log, fully rendered values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub label: String,
    pub percent_up: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

/// Outcome of one accounting step, handed back to the scheduler.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub status: Status,
    /// Unconditional per-tick status line (host + current streak).
    pub status_line: String,
    /// Present only when the throttling policy says a line is due.
    pub record: Option<LogRecord>,
}
