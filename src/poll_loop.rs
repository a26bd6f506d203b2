//! Periodic sensor polling
//!
//! Interactive mode projects every decoded group into the shared
//! [`DisplayState`] and rides out transport or decode failures group by group.
//! Headless mode prints a text report and stops at the first failure.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use roomba_core::config::PollConfig;
use roomba_core::{decode, project, DecodeError, DecodedSample, DisplayState};

use crate::report;
use crate::system::ShutdownSignal;
use crate::transport::{RobotLink, TransportError};

#[derive(Debug)]
pub enum PollError {
    Transport { group: u8, source: TransportError },
    Decode(DecodeError),
    /// Writing the headless report failed
    Output(io::Error),
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::Transport { group, source } => {
                write!(f, "reading sensor group {}: {}", group, source)
            }
            PollError::Decode(e) => write!(f, "{}", e),
            PollError::Output(e) => write!(f, "writing report: {}", e),
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::Transport { source, .. } => Some(source),
            PollError::Decode(e) => Some(e),
            PollError::Output(e) => Some(e),
        }
    }
}

impl From<DecodeError> for PollError {
    fn from(e: DecodeError) -> Self {
        PollError::Decode(e)
    }
}

impl From<io::Error> for PollError {
    fn from(e: io::Error) -> Self {
        PollError::Output(e)
    }
}

/// Fixed-rate tick. An overrunning cycle is not made up for; the next tick
/// starts a full period after the late one.
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now(),
        }
    }

    /// Wait for the next tick. Returns false once shutdown is requested.
    pub fn wait(&mut self, shutdown: &ShutdownSignal) -> bool {
        let now = Instant::now();
        self.next += self.period;
        if self.next < now {
            log::debug!("Poll cycle overran by {}ms", (now - self.next).as_millis());
            self.next = now;
        }
        !shutdown.wait_timeout(self.next - now)
    }
}

fn read_sample(link: &RobotLink, group: u8) -> Result<DecodedSample, PollError> {
    let raw = link
        .read_group(group)
        .map_err(|source| PollError::Transport { group, source })?;
    Ok(decode(group, &raw)?)
}

/// One interactive cycle over `groups`. Returns how many groups were projected.
pub fn poll_interactive_once(link: &RobotLink, groups: &[u8], state: &Mutex<DisplayState>) -> usize {
    let mut projected = 0;
    for &group in groups {
        match read_sample(link, group) {
            Ok(sample) => {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                project(&sample, &mut state);
                projected += 1;
            }
            Err(e) => log::warn!("Skipping group {}: {}", group, e),
        }
    }
    projected
}

/// Poll until shutdown, projecting into `state`
pub fn run_interactive(
    link: &RobotLink,
    config: &PollConfig,
    state: &Mutex<DisplayState>,
    shutdown: &ShutdownSignal,
) {
    let period = Duration::from_millis(config.interactive_period_ms);
    log::info!("Polling groups {:?} every {}ms", config.groups, period.as_millis());

    let mut ticker = Ticker::new(period);
    while !shutdown.is_shutdown_requested() {
        poll_interactive_once(link, &config.groups, state);
        if !ticker.wait(shutdown) {
            break;
        }
    }
    log::info!("Poll loop stopped");
}

/// One headless cycle: a timestamp line, then every group's report
pub fn poll_headless_once<W: Write>(link: &RobotLink, groups: &[u8], out: &mut W) -> Result<(), PollError> {
    report::write_timestamp(out, chrono::Local::now())?;
    for &group in groups {
        let sample = read_sample(link, group)?;
        report::write_sample(out, &sample)?;
    }
    out.flush()?;
    Ok(())
}

/// Poll and print until shutdown or the first failure
pub fn run_headless<W: Write>(
    link: &RobotLink,
    config: &PollConfig,
    out: &mut W,
    shutdown: &ShutdownSignal,
) -> Result<(), PollError> {
    let mut ticker = Ticker::new(Duration::from_millis(config.headless_period_ms));
    while !shutdown.is_shutdown_requested() {
        poll_headless_once(link, &config.groups, out).map_err(|e| {
            log::error!("Headless polling stopped: {}", e);
            e
        })?;
        if !ticker.wait(shutdown) {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use roomba_core::display_state::LabelSlot;
    use std::sync::Arc;
    use std::thread;

    const GROUP_3: [u8; 10] = [2, 0x3A, 0x98, 0xFF, 0x9C, 0xE7, 0x05, 0x46, 0x0A, 0x8C];

    fn poll_config(groups: Vec<u8>) -> PollConfig {
        PollConfig {
            interactive_period_ms: 10,
            headless_period_ms: 10,
            groups,
            ..PollConfig::default()
        }
    }

    #[test]
    fn test_interactive_projects_each_group() {
        let mock = MockTransport::new();
        mock.set_payload(3, GROUP_3.to_vec());
        mock.set_payload(1, vec![0b101, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let link = RobotLink::new(mock.clone());
        let state = Mutex::new(DisplayState::default());

        assert_eq!(poll_interactive_once(&link, &[3, 1], &state), 2);

        let state = state.lock().unwrap();
        assert_eq!(state.label(LabelSlot::ChargingState), "Full Charging");
        assert_eq!(state.battery.percent, 50.0);
        assert_eq!(state.wheel_flags, [true, false, true, false]);
        assert_eq!(mock.reads(), vec![3, 1]);
    }

    #[test]
    fn test_interactive_skips_failed_group() {
        let mock = MockTransport::new();
        mock.set_payload(3, GROUP_3.to_vec());
        mock.push_reply(1, Ok(vec![1, 2, 3]));
        let link = RobotLink::new(mock.clone());
        let state = Mutex::new(DisplayState::default());

        // group 1 short, group 2 silent, group 3 fine
        assert_eq!(poll_interactive_once(&link, &[1, 2, 3], &state), 1);
        assert_eq!(state.lock().unwrap().voltage_mv, 15000);
        assert_eq!(mock.reads(), vec![1, 2, 3]);
    }

    #[test]
    fn test_headless_report() {
        let mock = MockTransport::new();
        mock.set_payload(3, GROUP_3.to_vec());
        let link = RobotLink::new(mock);
        let mut out = Vec::new();

        poll_headless_once(&link, &[3], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[1].ends_with("Charging State:  2"));
        assert!(lines[6].ends_with("Battery Capacity:  2700"));
    }

    #[test]
    fn test_headless_stops_on_transport_error() {
        let mock = MockTransport::new();
        mock.set_payload(3, GROUP_3.to_vec());
        let link = RobotLink::new(mock);
        let mut out = Vec::new();

        let err = run_headless(&link, &poll_config(vec![3, 2]), &mut out, &ShutdownSignal::new())
            .unwrap_err();
        assert!(matches!(err, PollError::Transport { group: 2, .. }));
    }

    #[test]
    fn test_headless_stops_on_decode_error() {
        let mock = MockTransport::new();
        mock.set_payload(3, GROUP_3[..4].to_vec());
        let link = RobotLink::new(mock);
        let mut out = Vec::new();

        let err = run_headless(&link, &poll_config(vec![3]), &mut out, &ShutdownSignal::new())
            .unwrap_err();
        assert!(matches!(err, PollError::Decode(DecodeError::ShortPayload { .. })));
    }

    #[test]
    fn test_interactive_runs_until_shutdown() {
        let mock = MockTransport::new();
        mock.set_payload(3, GROUP_3.to_vec());
        let link = RobotLink::new(mock.clone());
        let state = Arc::new(Mutex::new(DisplayState::default()));
        let shutdown = ShutdownSignal::new();

        let handle = {
            let (link, state, shutdown) = (link.clone(), state.clone(), shutdown.clone());
            thread::spawn(move || run_interactive(&link, &poll_config(vec![3]), &state, &shutdown))
        };
        thread::sleep(Duration::from_millis(60));
        shutdown.request_shutdown();
        handle.join().unwrap();

        assert!(mock.reads().len() >= 2);
        assert!(state.lock().unwrap().samples_projected >= 2);
    }

    #[test]
    fn test_ticker_stops_on_shutdown() {
        let shutdown = ShutdownSignal::new();
        let mut ticker = Ticker::new(Duration::from_secs(60));
        shutdown.request_shutdown();
        assert!(!ticker.wait(&shutdown));
    }
}
