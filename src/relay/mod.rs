//! Relay abstraction used by the scheduler.
//!
//! The scheduler only ever asks for "on" or "off"; how that maps to a pin level
//! and which pin driver sits underneath is decided here. Two outputs exist:
//!
//! - **GPIO**: a Linux sysfs GPIO line ([`sysfs::SysfsPin`])
//! - **Virtual**: an in-memory pin that just logs ([`virtual_pin::VirtualPin`])
//!
//! Both are wrapped in [`pin::PinRelay`], which owns the rest-state polarity.

use anyhow::{Context, Result};
use std::fmt;

use crate::config::{Backend, Config};
use crate::logger::Log;

pub mod pin;
pub mod sysfs;
pub mod virtual_pin;

pub use pin::PinRelay;
pub use sysfs::{GpioError, SysfsPin};
pub use virtual_pin::VirtualPin;

/// Logical relay state, independent of pin polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    On,
    Off,
}

impl RelayState {
    pub fn toggled(self) -> Self {
        match self {
            RelayState::On => RelayState::Off,
            RelayState::Off => RelayState::On,
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayState::On => write!(f, "on"),
            RelayState::Off => write!(f, "off"),
        }
    }
}

/// A switchable output the scheduler drives.
///
/// Implementations must be idempotent: turning an already-on relay on again is
/// not an error. Any `Err` is treated as fatal by the scheduler.
pub trait Relay {
    fn turn_on(&mut self) -> Result<()>;

    fn turn_off(&mut self) -> Result<()>;

    /// Invert the current state.
    fn toggle(&mut self) -> Result<()>;

    /// Get a human-readable name for this relay output.
    fn backend_name(&self) -> &'static str;

    fn set_state(&mut self, state: RelayState) -> Result<()> {
        match state {
            RelayState::On => self.turn_on(),
            RelayState::Off => self.turn_off(),
        }
    }
}

impl<R: Relay + ?Sized> Relay for Box<R> {
    fn turn_on(&mut self) -> Result<()> {
        (**self).turn_on()
    }

    fn turn_off(&mut self) -> Result<()> {
        (**self).turn_off()
    }

    fn toggle(&mut self) -> Result<()> {
        (**self).toggle()
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn set_state(&mut self, state: RelayState) -> Result<()> {
        (**self).set_state(state)
    }
}

/// Create the relay output selected in the configuration.
///
/// The relay is driven to its rest state (off) before this returns.
///
/// # Errors
/// Returns an error if the GPIO line cannot be exported or configured.
pub fn create_relay(config: &Config) -> Result<Box<dyn Relay>> {
    let rest_state = config.rest_state();
    let pin_number = config.relay_pin();

    match config.backend() {
        Backend::Gpio => {
            let pin = SysfsPin::export(pin_number)
                .with_context(|| format!("Failed to set up GPIO {}", pin_number))?;
            let relay = PinRelay::new(pin, rest_state, "gpio")
                .with_context(|| format!("Failed to drive GPIO {} to rest state", pin_number))?;
            Log::log_decorated(&format!(
                "Using GPIO {} (rest state {})",
                pin_number,
                rest_state.as_str()
            ));
            Ok(Box::new(relay))
        }
        Backend::Virtual => {
            let relay = PinRelay::new(VirtualPin::new(pin_number), rest_state, "virtual")?;
            Log::log_decorated(&format!(
                "Using virtual relay on pin {} (no hardware is touched)",
                pin_number
            ));
            Ok(Box::new(relay))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_state_toggle() {
        assert_eq!(RelayState::On.toggled(), RelayState::Off);
        assert_eq!(RelayState::Off.toggled(), RelayState::On);
        assert_eq!(RelayState::On.to_string(), "on");
    }

    #[test]
    fn test_create_virtual_relay() {
        let config = Config {
            latitude: Some(0.0),
            longitude: Some(0.0),
            backend: Some(Backend::Virtual),
            relay_pin: Some(17),
            ..Default::default()
        };

        let mut relay = create_relay(&config).unwrap();
        assert_eq!(relay.backend_name(), "virtual");
        relay.turn_on().unwrap();
        relay.toggle().unwrap();
        relay.set_state(RelayState::On).unwrap();
    }
}
