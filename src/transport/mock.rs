//! In-memory transport for tests and demo runs without a robot
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use roomba_core::Command;

use super::{Transport, TransportError, TransportResult};

/// A command as the mock saw it, with the time it arrived
#[derive(Debug, Clone, Copy)]
pub struct SentCommand {
    pub command: Command,
    pub at: Instant,
}

#[derive(Default)]
struct MockState {
    /// Returned on every read of a group unless a scripted reply is queued
    payloads: HashMap<u8, Vec<u8>>,
    scripted: HashMap<u8, VecDeque<TransportResult<Vec<u8>>>>,
    sent: Vec<SentCommand>,
    reads: Vec<u8>,
    fail_sends: bool,
}

/// Cloning yields another handle onto the same robot, so a test can keep one
/// handle for inspection after handing the other to the link.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Serve `payload` for every read of `group`
    pub fn set_payload(&self, group: u8, payload: Vec<u8>) {
        self.state().payloads.insert(group, payload);
    }

    /// Queue a one-shot reply for the next read of `group`
    pub fn push_reply(&self, group: u8, reply: TransportResult<Vec<u8>>) {
        self.state().scripted.entry(group).or_default().push_back(reply);
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.state().fail_sends = fail;
    }

    pub fn sent(&self) -> Vec<SentCommand> {
        self.state().sent.clone()
    }

    pub fn sent_commands(&self) -> Vec<Command> {
        self.state().sent.iter().map(|s| s.command).collect()
    }

    /// Group ids in the order they were read
    pub fn reads(&self) -> Vec<u8> {
        self.state().reads.clone()
    }
}

impl Transport for MockTransport {
    fn read_group(&mut self, group: u8) -> TransportResult<Vec<u8>> {
        let mut state = self.state();
        state.reads.push(group);

        if let Some(reply) = state.scripted.get_mut(&group).and_then(|q| q.pop_front()) {
            return reply;
        }
        state
            .payloads
            .get(&group)
            .cloned()
            .ok_or(TransportError::Timeout {
                group,
                waited: std::time::Duration::ZERO,
            })
    }

    fn send_command(&mut self, command: Command) -> TransportResult<()> {
        let mut state = self.state();
        if state.fail_sends {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock send failure",
            )));
        }
        state.sent.push(SentCommand {
            command,
            at: Instant::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reply_precedes_payload() {
        let mock = MockTransport::new();
        mock.set_payload(3, vec![1, 2, 3]);
        mock.push_reply(3, Err(TransportError::Closed));

        let mut transport = mock.clone();
        assert!(matches!(transport.read_group(3), Err(TransportError::Closed)));
        assert_eq!(transport.read_group(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(mock.reads(), vec![3, 3]);
    }

    #[test]
    fn test_unknown_group_times_out() {
        let mut transport = MockTransport::new();
        assert!(matches!(
            transport.read_group(6),
            Err(TransportError::Timeout { group: 6, .. })
        ));
    }

    #[test]
    fn test_records_and_fails_sends() {
        let mock = MockTransport::new();
        let mut transport = mock.clone();

        transport.send_command(Command::Safe).unwrap();
        mock.set_fail_sends(true);
        assert!(transport.send_command(Command::Full).is_err());

        assert_eq!(mock.sent_commands(), vec![Command::Safe]);
    }
}
