//! Linux sysfs GPIO output pin.
//!
//! The legacy `/sys/class/gpio` interface is still the lowest common
//! denominator across single-board computers, and needs nothing beyond file
//! writes. The line is exported on first use and left exported on exit so the
//! relay keeps its last level while the service restarts.

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{SYSFS_EXPORT_SETTLE_MS, SYSFS_GPIO_ROOT};
use crate::logger::Log;

#[derive(Debug, Error)]
pub enum GpioError {
    #[error("GPIO {pin}: {action} failed: {source}")]
    Io {
        pin: u32,
        action: &'static str,
        #[source]
        source: io::Error,
    },
}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug)]
pub struct SysfsPin {
    number: u32,
    line_dir: PathBuf,
}

impl SysfsPin {
    /// Export GPIO `number` under the system sysfs root and configure it as an output.
    pub fn export(number: u32) -> Result<Self, GpioError> {
        Self::export_under(Path::new(SYSFS_GPIO_ROOT), number)
    }

    /// Same as [`SysfsPin::export`] against an arbitrary sysfs-like root.
    pub fn export_under(root: &Path, number: u32) -> Result<Self, GpioError> {
        let line_dir = root.join(format!("gpio{}", number));

        if !line_dir.exists() {
            fs::write(root.join("export"), number.to_string()).map_err(|source| {
                GpioError::Io {
                    pin: number,
                    action: "export",
                    source,
                }
            })?;
            Log::log_debug(&format!("Exported GPIO {}", number));
            std::thread::sleep(Duration::from_millis(SYSFS_EXPORT_SETTLE_MS));
        }

        fs::write(line_dir.join("direction"), "out").map_err(|source| GpioError::Io {
            pin: number,
            action: "set direction",
            source,
        })?;

        Ok(Self { number, line_dir })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    fn write_value(&mut self, value: &str) -> Result<(), GpioError> {
        fs::write(self.line_dir.join("value"), value).map_err(|source| GpioError::Io {
            pin: self.number,
            action: "write value",
            source,
        })
    }
}

impl ErrorType for SysfsPin {
    type Error = GpioError;
}

impl OutputPin for SysfsPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_value("0")
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_value("1")
    }
}
