//! Serial transport speaking the Open Interface over a tty at 115200 8N1
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use roomba_core::{groups, Command};
use serialport::{DataBits, Parity, SerialPort, StopBits};

use super::wake::{WakePin, WAKE_PULSE};
use super::{Transport, TransportError, TransportResult};

/// Open Interface default baud rate
pub const BAUD_RATE: u32 = 115_200;
const READ_CHUNK: usize = 64;

type Chunk = io::Result<Vec<u8>>;

pub struct SerialTransport<W: Write + Send = Box<dyn SerialPort>> {
    writer: W,
    chunks: Receiver<Chunk>,
    read_timeout: Duration,
}

impl SerialTransport<Box<dyn SerialPort>> {
    /// Open the tty at `path`, optionally pulse the wake line, and start the Open Interface
    pub fn open(path: &str, read_timeout: Duration, wake: Option<&WakePin>) -> TransportResult<Self> {
        if let Some(pin) = wake {
            pin.pulse(WAKE_PULSE).map_err(TransportError::Wake)?;
        }

        let open_err = |e: serialport::Error| TransportError::Open {
            path: path.to_string(),
            source: e.into(),
        };
        // The port timeout only bounds each read on the reader thread
        let port = serialport::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(read_timeout)
            .open()
            .map_err(open_err)?;
        let reader = port.try_clone().map_err(open_err)?;

        let mut transport = Self::from_parts(reader, port, read_timeout)?;
        transport.start()?;
        log::info!("Opened {} (read timeout {}ms)", path, read_timeout.as_millis());
        Ok(transport)
    }
}

impl<W: Write + Send> SerialTransport<W> {
    /// Build a transport over any byte stream. Reads happen on a background
    /// thread so a silent device can never block a caller past its deadline.
    pub fn from_parts<R>(reader: R, writer: W, read_timeout: Duration) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("serial-reader".to_string())
            .spawn(move || reader_loop(reader, tx))?;

        Ok(Self {
            writer,
            chunks: rx,
            read_timeout,
        })
    }

    pub fn start(&mut self) -> TransportResult<()> {
        self.send_command(Command::Start)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> TransportResult<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Throw away bytes left over from an earlier exchange that timed out
    fn discard_stale(&mut self) -> TransportResult<()> {
        let mut discarded = 0usize;
        loop {
            match self.chunks.try_recv() {
                Ok(Ok(chunk)) => discarded += chunk.len(),
                Ok(Err(e)) => return Err(TransportError::Io(e)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(TransportError::Closed),
            }
        }
        if discarded > 0 {
            log::debug!("Discarded {} stale bytes", discarded);
        }
        Ok(())
    }
}

impl<W: Write + Send> Transport for SerialTransport<W> {
    fn read_group(&mut self, group: u8) -> TransportResult<Vec<u8>> {
        let expected = groups::lookup(group)
            .map(|g| g.total_width())
            .ok_or_else(|| {
                TransportError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unknown sensor group {}", group),
                ))
            })?;

        self.discard_stale()?;
        self.write_bytes(&Command::Sensors(group).encode())?;

        let started = Instant::now();
        let deadline = started + self.read_timeout;
        let mut payload = Vec::with_capacity(expected);

        while payload.len() < expected {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.chunks.recv_timeout(remaining) {
                Ok(Ok(chunk)) => payload.extend_from_slice(&chunk),
                Ok(Err(e)) => return Err(TransportError::Io(e)),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return Err(TransportError::Closed),
            }
        }

        if payload.is_empty() {
            return Err(TransportError::Timeout {
                group,
                waited: started.elapsed(),
            });
        }
        if payload.len() < expected {
            // Hand the short payload on; the decoder reports it
            log::debug!("Group {}: {} of {} bytes before deadline", group, payload.len(), expected);
        }
        Ok(payload)
    }

    fn send_command(&mut self, command: Command) -> TransportResult<()> {
        log::debug!("-> {}", command);
        self.write_bytes(&command.encode())
    }
}

fn reader_loop<R: Read>(mut reader: R, tx: Sender<Chunk>) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                log::warn!("Serial device closed");
                break;
            }
            Ok(n) => {
                if tx.send(Ok(buf[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                ) =>
            {
                continue
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Blocking reader fed from a channel, like a tty with nothing to say
    struct ChannelReader {
        rx: Receiver<Vec<u8>>,
        pending: Vec<u8>,
    }

    impl Read for ChannelReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pending.is_empty() {
                match self.rx.recv() {
                    Ok(chunk) => self.pending = chunk,
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    /// Reports a read timeout before every chunk, as an idle serial port does
    struct IdlePort {
        inner: ChannelReader,
        idle_next: bool,
    }

    impl Read for IdlePort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.idle_next = !self.idle_next;
            if self.idle_next {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "idle"));
            }
            self.inner.read(buf)
        }
    }

    /// Answers sensor requests with canned replies
    struct FakeRobot {
        replies: HashMap<u8, Vec<u8>>,
        tx: Sender<Vec<u8>>,
        written: Arc<Mutex<Vec<u8>>>,
    }

    impl Write for FakeRobot {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.lock().unwrap().extend_from_slice(buf);
            if buf.len() == 2 && buf[0] == 142 {
                if let Some(reply) = self.replies.get(&buf[1]) {
                    let _ = self.tx.send(reply.clone());
                }
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn transport(
        replies: &[(u8, Vec<u8>)],
        timeout_ms: u64,
    ) -> (SerialTransport<FakeRobot>, Arc<Mutex<Vec<u8>>>) {
        let (tx, rx) = mpsc::channel();
        let written = Arc::new(Mutex::new(Vec::new()));
        let robot = FakeRobot {
            replies: replies.iter().cloned().collect(),
            tx,
            written: written.clone(),
        };
        let reader = ChannelReader { rx, pending: Vec::new() };
        let transport =
            SerialTransport::from_parts(reader, robot, Duration::from_millis(timeout_ms)).unwrap();
        (transport, written)
    }

    #[test]
    fn test_reads_full_group() {
        let reply: Vec<u8> = (0..10).collect();
        let (mut transport, written) = transport(&[(3, reply.clone())], 500);

        assert_eq!(transport.read_group(3).unwrap(), reply);
        assert_eq!(*written.lock().unwrap(), vec![142, 3]);
    }

    #[test]
    fn test_port_read_timeouts_do_not_close_the_link() {
        let (tx, rx) = mpsc::channel();
        let robot = FakeRobot {
            replies: [(3u8, (0..10).collect::<Vec<u8>>())].into_iter().collect(),
            tx,
            written: Arc::new(Mutex::new(Vec::new())),
        };
        let reader = IdlePort {
            inner: ChannelReader { rx, pending: Vec::new() },
            idle_next: false,
        };
        let mut transport =
            SerialTransport::from_parts(reader, robot, Duration::from_millis(500)).unwrap();

        assert_eq!(transport.read_group(3).unwrap().len(), 10);
        assert_eq!(transport.read_group(3).unwrap().len(), 10);
    }

    #[test]
    fn test_line_speed_matches_open_interface_default() {
        assert_eq!(BAUD_RATE, 115_200);
    }

    #[test]
    fn test_partial_reply_is_returned_short() {
        let (mut transport, _) = transport(&[(3, vec![1, 2, 3])], 30);
        assert_eq!(transport.read_group(3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_silence_is_timeout() {
        let (mut transport, _) = transport(&[], 20);
        let started = Instant::now();
        assert!(matches!(
            transport.read_group(6),
            Err(TransportError::Timeout { group: 6, .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_unknown_group_is_rejected_before_writing() {
        let (mut transport, written) = transport(&[], 20);
        assert!(transport.read_group(99).is_err());
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_commands_are_encoded() {
        let (mut transport, written) = transport(&[], 20);
        transport.start().unwrap();
        transport.send_command(Command::drive(100, 1)).unwrap();
        assert_eq!(*written.lock().unwrap(), vec![128, 137, 0, 100, 0, 1]);
    }
}
