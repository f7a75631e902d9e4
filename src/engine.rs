use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::time::Duration;
use tracing::info;

use crate::config::{Labels, MonitorConfig};
use crate::logfile::{LogFile, RecordLog};
use crate::models::{ConnectivityState, LogRecord, Status, TickReport};
use crate::probe::Prober;
use crate::sink::StatusSink;
use crate::utils::{format_streak, split_days_hours_mins};

/// Up-repeat ticks are logged only every this many ticks; down-repeats are
/// logged every tick so no outage datapoint is ever dropped.
const UP_LOG_EVERY_TICKS: u64 = 360;

/// Result of accounting for one probe result: the state to commit and the
/// outputs to deliver. Nothing is committed until the log write succeeds.
struct TickOutcome {
    next_state: ConnectivityState,
    report: TickReport,
}

/// One accounting step. Pure: reads `state`, never mutates it.
///
/// Record fields (percent, day/hour/minute columns) are computed from the
/// counters as they stood *before* this tick's interval is added, and the
/// up-throttle is evaluated on the pre-increment streak — so the first tick
/// of an up streak (streak 0) always logs, as does every 360th repeat.
fn account(
    state: &ConnectivityState,
    up: bool,
    interval_secs: u64,
    now: DateTime<Local>,
    host: &str,
    labels: &Labels,
) -> TickOutcome {
    let result = if up { Status::Up } else { Status::Down };

    // A result change ends the previous streak; the new one starts at zero.
    let prior_streak = if state.last_result == result {
        state.current_streak_secs
    } else {
        0
    };

    let log_due = match result {
        Status::Up => (prior_streak / interval_secs) % UP_LOG_EVERY_TICKS == 0,
        Status::Down => true,
    };

    let record = log_due.then(|| {
        let (days, hours, minutes) = split_days_hours_mins(state.lifetime_secs());
        LogRecord {
            timestamp: now,
            label: if up {
                labels.ok.clone()
            } else {
                labels.no_connection.clone()
            },
            percent_up: state.percent_up(),
            days,
            hours,
            minutes,
        }
    });

    let mut next_state = state.clone();
    next_state.last_result = result;
    next_state.current_streak_secs = prior_streak + interval_secs;
    match result {
        Status::Up => next_state.total_up_secs += interval_secs,
        Status::Down => next_state.total_down_secs += interval_secs,
    }

    let template = if up { &labels.connected } else { &labels.disconnected };
    let status_line = template
        .replace("{host}", host)
        .replace("{streak}", &format_streak(next_state.current_streak_secs));

    TickOutcome {
        next_state,
        report: TickReport {
            status: result,
            status_line,
            record,
        },
    }
}

pub struct Monitor<L = LogFile> {
    config: MonitorConfig,
    prober: Prober,
    state: ConnectivityState,
    log: L,
    sink: Box<dyn StatusSink>,
}

impl Monitor {
    /// Opens the log (header if new), appends the startup marker record and
    /// prepares the resolver. Counters start at zero on every launch.
    pub fn new(config: MonitorConfig, sink: Box<dyn StatusSink>) -> Result<Self> {
        let prober = Prober::new(Duration::from_millis(config.resolve_timeout_ms))?;
        let mut log = LogFile::open(&config.out_file, &config.labels.columns)?;
        log.append(&LogRecord {
            timestamp: Local::now(),
            label: config.labels.started.clone(),
            percent_up: 0,
            days: 0,
            hours: 0,
            minutes: 0,
        })
        .context("Failed to write startup marker")?;

        Ok(Self {
            config,
            prober,
            state: ConnectivityState::new(),
            log,
            sink,
        })
    }
}

impl<L: RecordLog> Monitor<L> {
    /// Serialized tick loop: the first check runs immediately, and each wait
    /// starts only after the previous tick's work (probe, accounting, log
    /// write, status update) has finished. Ticks can be delayed by a slow
    /// probe but never overlap. A failed tick is reported and skipped; the
    /// loop itself never stops.
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Monitoring {} every {}s, logging to {}",
            self.config.host,
            self.config.check_interval,
            self.config.out_file.display()
        );
        let pause = Duration::from_secs(self.config.check_interval);
        loop {
            if let Err(e) = self.tick().await {
                self.sink.report_error(&format!("Error: {:#}", e));
            }
            tokio::time::sleep(pause).await;
        }
    }

    async fn tick(&mut self) -> Result<()> {
        let up = self.prober.check(&self.config.host).await;
        self.apply(up, Local::now())
    }

    /// Accounts for one probe result. The log write happens before the state
    /// commit, so a write failure leaves the counters at their pre-tick
    /// values and the tick is retried-from-scratch semantics-wise next time.
    fn apply(&mut self, up: bool, now: DateTime<Local>) -> Result<()> {
        let outcome = account(
            &self.state,
            up,
            self.config.check_interval,
            now,
            &self.config.host,
            &self.config.labels,
        );
        if let Some(record) = &outcome.report.record {
            self.log.append(record)?;
        }
        self.state = outcome.next_state;
        self.sink
            .update(outcome.report.status, &outcome.report.status_line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::TracingSink;
    use anyhow::bail;
    use chrono::TimeZone;

    fn labels() -> Labels {
        Labels::default()
    }

    /// In-memory record log that can be told to reject appends, standing in
    /// for a log file on a full or unwritable disk.
    struct FlakyLog {
        records: Vec<LogRecord>,
        fail: bool,
    }

    impl RecordLog for FlakyLog {
        fn append(&mut self, record: &LogRecord) -> Result<()> {
            if self.fail {
                bail!("disk full");
            }
            self.records.push(record.clone());
            Ok(())
        }
    }

    fn test_monitor(log: FlakyLog) -> Monitor<FlakyLog> {
        Monitor {
            config: MonitorConfig {
                host: "example.org".into(),
                check_interval: 10,
                out_file: "unused.csv".into(),
                resolve_timeout_ms: 100,
                labels: labels(),
            },
            prober: Prober::new(Duration::from_millis(100)).expect("prober"),
            state: ConnectivityState::new(),
            log,
            sink: Box::new(TracingSink),
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap()
    }

    /// Replays a result sequence through the accounting step, collecting the
    /// emitted records.
    fn replay(results: &[bool], interval: u64) -> (ConnectivityState, Vec<LogRecord>) {
        let labels = labels();
        let mut state = ConnectivityState::new();
        let mut records = Vec::new();
        for &up in results {
            let outcome = account(&state, up, interval, fixed_now(), "example.org", &labels);
            if let Some(record) = outcome.report.record {
                records.push(record);
            }
            state = outcome.next_state;
        }
        (state, records)
    }

    #[test]
    fn totals_always_sum_to_elapsed_time() {
        let results = [true, true, false, false, false, true];
        let (state, _) = replay(&results, 7);
        assert_eq!(state.total_up_secs, 3 * 7);
        assert_eq!(state.total_down_secs, 3 * 7);
        assert_eq!(state.lifetime_secs(), results.len() as u64 * 7);
    }

    #[test]
    fn streak_grows_while_result_repeats_and_resets_on_change() {
        let labels = labels();
        let mut state = ConnectivityState::new();
        for expected in [10, 20, 30] {
            state = account(&state, true, 10, fixed_now(), "h", &labels).next_state;
            assert_eq!(state.current_streak_secs, expected);
            assert_eq!(state.last_result, Status::Up);
        }
        state = account(&state, false, 10, fixed_now(), "h", &labels).next_state;
        assert_eq!(state.current_streak_secs, 10);
        assert_eq!(state.last_result, Status::Down);
        state = account(&state, true, 10, fixed_now(), "h", &labels).next_state;
        assert_eq!(state.current_streak_secs, 10);
        assert_eq!(state.last_result, Status::Up);
    }

    #[test]
    fn every_transition_is_logged() {
        // up, up(repeat, not due), down(transition), down(repeat), up(transition)
        let (_, records) = replay(&[true, true, false, false, true], 10);
        let seq: Vec<&str> = records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(seq, ["OK", "no connection", "no connection", "OK"]);
    }

    #[test]
    fn up_repeats_throttle_on_tick_count_modulus() {
        // 722 consecutive up ticks at 10s: logged at pre-increment streaks
        // 0, 3600 and 7200 seconds — ticks 1, 361 and 721.
        let results = vec![true; 722];
        let (_, records) = replay(&results, 10);
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn down_repeats_are_never_throttled() {
        let results = vec![false; 5];
        let (_, records) = replay(&results, 10);
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.label == "no connection"));
    }

    #[test]
    fn percent_conventions() {
        let zero = ConnectivityState::new();
        assert_eq!(zero.percent_up(), 100);

        let mixed = ConnectivityState {
            last_result: Status::Down,
            current_streak_secs: 25,
            total_up_secs: 75,
            total_down_secs: 25,
        };
        assert_eq!(mixed.percent_up(), 75);

        // Truncating division: 2/3 up -> 66, not 67.
        let thirds = ConnectivityState {
            total_up_secs: 20,
            total_down_secs: 10,
            ..ConnectivityState::new()
        };
        assert_eq!(thirds.percent_up(), 66);
    }

    #[test]
    fn record_fields_reflect_pre_tick_counters() {
        // Three up ticks of 25s, then a down transition: its record shows
        // the 75/0 split that stood before the down interval accrued.
        let (_, records) = replay(&[true, true, true, false], 25);
        let down = records.last().unwrap();
        assert_eq!(down.label, "no connection");
        assert_eq!(down.percent_up, 100);
        assert_eq!((down.days, down.hours, down.minutes), (0, 0, 1));

        // And the very first record sees the all-zero startup counters.
        assert_eq!(records[0].percent_up, 100);
        assert_eq!((records[0].days, records[0].hours, records[0].minutes), (0, 0, 0));
    }

    #[test]
    fn replay_is_deterministic() {
        let results = [true, false, false, true, true, false];
        let (state_a, records_a) = replay(&results, 10);
        let (state_b, records_b) = replay(&results, 10);
        assert_eq!(state_a, state_b);
        assert_eq!(records_a, records_b);
    }

    #[test]
    fn account_does_not_mutate_input_state() {
        let state = ConnectivityState::new();
        let before = state.clone();
        let _ = account(&state, false, 10, fixed_now(), "h", &labels());
        assert_eq!(state, before);
    }

    #[test]
    fn failed_append_leaves_counters_untouched() {
        let mut monitor = test_monitor(FlakyLog { records: Vec::new(), fail: true });
        let before = monitor.state.clone();

        // Down tick, so a record is always due and the append is attempted.
        assert!(monitor.apply(false, fixed_now()).is_err());
        assert_eq!(monitor.state, before);
        assert!(monitor.log.records.is_empty());

        // Once the log recovers, the next tick accounts normally.
        monitor.log.fail = false;
        monitor.apply(false, fixed_now()).expect("tick after log recovery");
        assert_eq!(monitor.state.total_down_secs, 10);
        assert_eq!(monitor.state.current_streak_secs, 10);
        assert_eq!(monitor.log.records.len(), 1);
    }

    #[test]
    fn status_line_shows_host_and_post_tick_streak() {
        let labels = labels();
        let state = ConnectivityState::new();
        let outcome = account(&state, true, 90_061, fixed_now(), "example.org", &labels);
        assert_eq!(outcome.report.status_line, "example.org: up for 1.01:01:01");
        assert_eq!(outcome.report.status, Status::Up);

        let outcome = account(&state, false, 10, fixed_now(), "example.org", &labels);
        assert_eq!(
            outcome.report.status_line,
            "example.org: unreachable for 00:00:10"
        );
        assert_eq!(outcome.report.status, Status::Down);
    }
}
