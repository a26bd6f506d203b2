//! Roomba telemetry dashboard
//!
//! Polls an iRobot Open Interface robot over a serial link, projects the
//! decoded telemetry into a [`roomba_core::DisplayState`] and turns operator
//! keys into drive and mode commands.

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod log_buffer;
pub mod logging;
pub mod poll_loop;
pub mod report;
pub mod system;
pub mod transport;
pub mod ui;

pub use app::Dashboard;
pub use dispatcher::{CommandDispatcher, DispatchError, Intent};
pub use poll_loop::PollError;
pub use system::ShutdownSignal;
pub use transport::{MockTransport, RobotLink, SerialTransport, Transport, TransportError};
