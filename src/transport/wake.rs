//! Baud-rate-change (BRC) wake line, driven through sysfs GPIO
//!
//! Pulling BRC low for a moment wakes a sleeping robot so it will accept the
//! Open Interface start command.
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";
pub const WAKE_PULSE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakePin {
    number: u32,
    root: PathBuf,
}

impl WakePin {
    pub fn new(number: u32) -> Self {
        Self::with_root(number, SYSFS_GPIO_ROOT)
    }

    /// Use a different sysfs root; tests point this at a scratch directory
    pub fn with_root(number: u32, root: impl Into<PathBuf>) -> Self {
        Self {
            number,
            root: root.into(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    fn pin_dir(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.number))
    }

    /// Drive the line low for `low_for`, then high again
    pub fn pulse(&self, low_for: Duration) -> io::Result<()> {
        let pin_dir = self.pin_dir();
        if !pin_dir.exists() {
            log::debug!("Exporting GPIO {}", self.number);
            fs::write(self.root.join("export"), self.number.to_string())?;
        }

        fs::write(pin_dir.join("direction"), "out")?;
        let value = pin_dir.join("value");
        fs::write(&value, "0")?;
        thread::sleep(low_for);
        fs::write(&value, "1")?;

        log::info!("Pulsed wake line on GPIO {} for {}ms", self.number, low_for.as_millis());
        Ok(())
    }
}

impl FromStr for WakePin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(WakePin::new)
            .map_err(|_| format!("'{}' is not a sysfs GPIO number", s))
    }
}
