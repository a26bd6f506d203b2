//! Operator intents to robot commands, with the auto-stop for drive keys
//!
//! Every directional intent sends its drive command and arms an auto-stop.
//! Arms are numbered: the dispatcher bumps a generation counter on every
//! intent while holding the robot link, and the timer only sends its stop if
//! its generation is still the newest when it takes the link. A superseded
//! timer therefore can never stop a newer movement, and the stop can never
//! be reordered ahead of a later drive.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use roomba_core::commands::{RADIUS_STRAIGHT, TURN_CCW, TURN_CW};
use roomba_core::config::DriveConfig;
use roomba_core::Command;

use crate::system::ShutdownSignal;
use crate::transport::{RobotLink, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
    Stop,
    SetModePassive,
    SetModeSafe,
    SetModeFull,
    SeekDock,
    PowerDown,
    /// Leave the dashboard without touching the robot
    Quit,
}

impl Intent {
    pub fn is_directional(self) -> bool {
        matches!(
            self,
            Intent::MoveForward | Intent::MoveBackward | Intent::TurnLeft | Intent::TurnRight
        )
    }

    /// The command this intent sends, if any
    pub fn command(self, drive: &DriveConfig) -> Option<Command> {
        let command = match self {
            Intent::MoveForward => Command::drive(drive.speed_mm_s, RADIUS_STRAIGHT),
            Intent::MoveBackward => Command::drive(-drive.speed_mm_s, RADIUS_STRAIGHT),
            Intent::TurnLeft => Command::drive(drive.turn_speed_mm_s, TURN_CCW),
            Intent::TurnRight => Command::drive(drive.turn_speed_mm_s, TURN_CW),
            Intent::Stop => Command::Stop,
            Intent::SetModePassive => Command::Start,
            Intent::SetModeSafe => Command::Safe,
            Intent::SetModeFull => Command::Full,
            Intent::SeekDock => Command::SeekDock,
            Intent::PowerDown => Command::Power,
            Intent::Quit => return None,
        };
        Some(command)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::MoveForward => "move forward",
            Intent::MoveBackward => "move backward",
            Intent::TurnLeft => "turn left",
            Intent::TurnRight => "turn right",
            Intent::Stop => "stop",
            Intent::SetModePassive => "passive mode",
            Intent::SetModeSafe => "safe mode",
            Intent::SetModeFull => "full mode",
            Intent::SeekDock => "seek dock",
            Intent::PowerDown => "power down",
            Intent::Quit => "quit",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum DispatchError {
    Send { intent: Intent, source: TransportError },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Send { intent, source } => write!(f, "{} failed: {}", intent, source),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Send { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    /// A drive command is out and its auto-stop is armed
    Moving,
}

#[derive(Debug, Clone, Copy)]
struct Arm {
    generation: u64,
    deadline: Instant,
}

/// State shared between the dispatcher and its timer worker
struct TimerShared {
    link: RobotLink,
    generation: AtomicU64,
    moving: AtomicBool,
}

pub struct CommandDispatcher {
    shared: Arc<TimerShared>,
    drive: DriveConfig,
    shutdown: ShutdownSignal,
    arms: Option<Sender<Arm>>,
    worker: Option<JoinHandle<()>>,
}

impl CommandDispatcher {
    pub fn new(link: RobotLink, drive: DriveConfig, shutdown: ShutdownSignal) -> std::io::Result<Self> {
        let shared = Arc::new(TimerShared {
            link,
            generation: AtomicU64::new(0),
            moving: AtomicBool::new(false),
        });
        let (tx, rx) = mpsc::channel();
        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name("auto-stop".to_string())
            .spawn(move || timer_loop(rx, worker_shared))?;

        Ok(Self {
            shared,
            drive,
            shutdown,
            arms: Some(tx),
            worker: Some(worker),
        })
    }

    pub fn auto_stop_delay(&self) -> Duration {
        Duration::from_millis(self.drive.auto_stop_ms)
    }

    pub fn motion(&self) -> MotionState {
        if self.shared.moving.load(Ordering::SeqCst) {
            MotionState::Moving
        } else {
            MotionState::Idle
        }
    }

    /// Send the command for `intent`. Transport failures are logged and
    /// returned; the dispatcher stays usable for the next intent.
    pub fn dispatch(&self, intent: Intent) -> Result<(), DispatchError> {
        log::debug!("Intent: {}", intent);

        let result = {
            let mut transport = self.shared.link.lock();
            // Any intent voids the pending auto-stop
            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let sent = match intent.command(&self.drive) {
                Some(command) => transport.send_command(command),
                None => Ok(()),
            };
            self.shared.moving.store(intent.is_directional(), Ordering::SeqCst);
            if intent.is_directional() {
                self.arm(generation);
            }
            sent
        };

        match intent {
            Intent::PowerDown => {
                log::info!("Powering down");
                log::logger().flush();
                self.shutdown.request_shutdown();
            }
            Intent::Quit => self.shutdown.request_shutdown(),
            _ => {}
        }

        result.map_err(|source| {
            log::error!("{} failed: {}", intent, source);
            DispatchError::Send { intent, source }
        })
    }

    fn arm(&self, generation: u64) {
        let arm = Arm {
            generation,
            deadline: Instant::now() + self.auto_stop_delay(),
        };
        if let Some(tx) = &self.arms {
            if tx.send(arm).is_err() {
                log::warn!("Auto-stop worker is gone; robot will not stop by itself");
            }
        }
    }
}

impl Drop for CommandDispatcher {
    fn drop(&mut self) {
        // Closing the channel ends the worker; a pending stop fires at once
        self.arms.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn timer_loop(rx: Receiver<Arm>, shared: Arc<TimerShared>) {
    let mut pending: Option<Arm> = None;
    loop {
        pending = match pending {
            None => match rx.recv() {
                Ok(arm) => Some(arm),
                Err(_) => break,
            },
            Some(arm) => {
                let remaining = arm.deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(remaining) {
                    Ok(newer) => Some(newer),
                    Err(RecvTimeoutError::Timeout) => {
                        fire(&shared, arm);
                        None
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        // Dispatcher dropped mid-move
                        fire(&shared, arm);
                        break;
                    }
                }
            }
        };
    }
}

fn fire(shared: &TimerShared, arm: Arm) {
    let mut transport = shared.link.lock();
    if shared.generation.load(Ordering::SeqCst) != arm.generation {
        log::trace!("Auto-stop {} superseded", arm.generation);
        return;
    }
    shared.moving.store(false, Ordering::SeqCst);
    match transport.send_command(Command::halt()) {
        Ok(()) => log::debug!("Auto-stop"),
        Err(e) => log::warn!("Auto-stop failed: {}", e),
    }
}
