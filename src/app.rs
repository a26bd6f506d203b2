//! Wiring of link, poll loop, dispatcher and panel for the two run modes
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use roomba_core::packets::{self, Width};
use roomba_core::{groups, DashConfig, DisplayState};

use crate::dispatcher::CommandDispatcher;
use crate::log_buffer;
use crate::poll_loop::{self, PollError};
use crate::system::ShutdownSignal;
use crate::transport::{MockTransport, RobotLink};
use crate::ui;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const PANEL_LOG_LINES: usize = 8;

pub struct Dashboard {
    link: RobotLink,
    config: DashConfig,
    shutdown: ShutdownSignal,
}

impl Dashboard {
    pub fn new(link: RobotLink, config: DashConfig) -> Self {
        Self {
            link,
            config,
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Print the text report until shutdown; the first failure ends the run
    pub fn run_headless<W: Write>(&self, out: &mut W) -> Result<(), PollError> {
        log::info!("Headless report, groups {:?}", self.config.poll.groups);
        poll_loop::run_headless(&self.link, &self.config.poll, out, &self.shutdown)
    }

    /// Poll in the background, dispatch keys as they arrive and redraw the
    /// panel into `out` once per poll period. Returns the final display state.
    pub fn run_interactive<W: Write>(&self, keys: Receiver<String>, out: &mut W) -> Result<DisplayState> {
        let state = Mutex::new(DisplayState::new(self.config.history));
        let dispatcher = CommandDispatcher::new(
            self.link.clone(),
            self.config.drive.clone(),
            self.shutdown.clone(),
        )
        .context("starting auto-stop worker")?;

        let result = thread::scope(|scope| {
            scope.spawn(|| {
                poll_loop::run_interactive(&self.link, &self.config.poll, &state, &self.shutdown)
            });
            let result = self.operator_loop(&dispatcher, &keys, &state, out);
            // The poll thread must see this before the scope can end
            self.shutdown.request_shutdown();
            result
        });
        drop(dispatcher);
        result?;

        let state = state.into_inner().unwrap_or_else(PoisonError::into_inner);
        Ok(state)
    }

    fn operator_loop<W: Write>(
        &self,
        dispatcher: &CommandDispatcher,
        keys: &Receiver<String>,
        state: &Mutex<DisplayState>,
        out: &mut W,
    ) -> Result<()> {
        let redraw = Duration::from_millis(self.config.poll.interactive_period_ms);
        while !self.shutdown.is_shutdown_requested() {
            match keys.recv_timeout(redraw) {
                Ok(key) => match ui::intent_for_key(&key) {
                    // Failures are logged by the dispatcher and shown in the panel
                    Some(intent) => {
                        let _ = dispatcher.dispatch(intent);
                    }
                    None => log::debug!("Unbound key {:?}", key.trim()),
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::info!("Key input closed");
                    break;
                }
            }

            let snapshot = state.lock().unwrap_or_else(PoisonError::into_inner).clone();
            let logs = log_buffer::global()
                .map(|buffer| buffer.recent(PANEL_LOG_LINES))
                .unwrap_or_default();
            write!(out, "{}{}", CLEAR_SCREEN, ui::render(&snapshot, &logs, chrono::Local::now()))
                .context("drawing panel")?;
            out.flush().context("drawing panel")?;
        }
        Ok(())
    }
}

/// Forward lines from `input` as key names. The reader thread is detached
/// since a blocking read cannot be interrupted; it ends with the input.
pub fn spawn_key_reader<R: BufRead + Send + 'static>(input: R) -> Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("keys".to_string())
        .spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("starting key reader")?;
    Ok(rx)
}

/// A simulated robot sitting on its dock, half charged, for runs without hardware
pub fn demo_transport(poll_groups: &[u8]) -> MockTransport {
    let values: &[(u8, i32)] = &[
        (packets::CHARGING_STATE, 3),
        (packets::VOLTAGE, 15_200),
        (packets::CURRENT, -120),
        (packets::TEMPERATURE, 27),
        (packets::BATTERY_CHARGE, 1_350),
        (packets::BATTERY_CAPACITY, 2_700),
        (packets::CHARGING_SOURCES, 2),
        (packets::OI_MODE, 1),
        (packets::IR_OMNI, 172),
    ];

    let mock = MockTransport::new();
    for &group in poll_groups {
        let Some(spec) = groups::lookup(group) else { continue };
        let mut payload = Vec::with_capacity(spec.total_width());
        for packet in spec.packets() {
            let value = values
                .iter()
                .find(|(id, _)| *id == packet.id)
                .map_or(0, |&(_, v)| v);
            match packet.width {
                Width::One => payload.push(value as u8),
                Width::Two => payload.extend_from_slice(&(value as u16).to_be_bytes()),
            }
        }
        mock.set_payload(group, payload);
    }
    mock
}

pub fn write_snapshot(state: &DisplayState, path: &std::path::Path) -> Result<()> {
    let json = state.to_json().context("serializing display state")?;
    std::fs::write(path, json).with_context(|| format!("writing snapshot {}", path.display()))?;
    log::info!("Snapshot written to {}", path.display());
    Ok(())
}

/// Link to a simulated robot serving every configured group
pub fn demo_link(config: &DashConfig) -> RobotLink {
    RobotLink::new(demo_transport(&config.poll.groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomba_core::commands::RADIUS_STRAIGHT;
    use roomba_core::display_state::LabelSlot;
    use roomba_core::{decode, Command};
    use crate::transport::Transport;

    fn fast_config() -> DashConfig {
        let mut config = DashConfig::default();
        config.poll.interactive_period_ms = 10;
        config.poll.headless_period_ms = 10;
        config.drive.auto_stop_ms = 20;
        config
    }

    #[test]
    fn test_demo_payloads_decode() {
        let mock = demo_transport(&[6, 101]);
        let mut transport = mock.clone();
        let sample = decode(6, &transport.read_group(6).unwrap()).unwrap();
        assert_eq!(sample.get(packets::BATTERY_CHARGE), Some(1_350));
        assert_eq!(sample.get(packets::CURRENT), Some(-120));
        assert!(decode(101, &transport.read_group(101).unwrap()).is_ok());
    }

    #[test]
    fn test_interactive_dispatches_keys_and_stops_on_quit() {
        let config = fast_config();
        let mock = demo_transport(&config.poll.groups);
        let dashboard = Dashboard::new(RobotLink::new(mock.clone()), config);

        let (tx, rx) = mpsc::channel();
        let typist = thread::spawn(move || {
            tx.send("up".to_string()).unwrap();
            thread::sleep(Duration::from_millis(80));
            tx.send("q".to_string()).unwrap();
        });

        let mut out = Vec::new();
        let state = dashboard.run_interactive(rx, &mut out).unwrap();
        typist.join().unwrap();

        assert_eq!(
            mock.sent_commands(),
            vec![Command::drive(100, RADIUS_STRAIGHT), Command::halt()]
        );
        assert_eq!(state.label(LabelSlot::Mode), "Passive");
        assert!(String::from_utf8_lossy(&out).contains("Roomba Dashboard"));
    }

    #[test]
    fn test_interactive_ends_when_keys_close() {
        let dashboard = Dashboard::new(demo_link(&fast_config()), fast_config());
        let (tx, rx) = mpsc::channel::<String>();
        drop(tx);
        let mut out = Vec::new();
        assert!(dashboard.run_interactive(rx, &mut out).is_ok());
        assert!(dashboard.shutdown_signal().is_shutdown_requested());
    }
}
