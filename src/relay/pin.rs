//! Relay driven through any `embedded-hal` output pin.

use anyhow::{Context, Result};
use embedded_hal::digital::OutputPin;

use super::{Relay, RelayState};
use crate::config::RestState;
use crate::logger::Log;

pub struct PinRelay<P>
where
    P: OutputPin,
{
    pin: P,
    rest_state: RestState,
    state: RelayState,
    name: &'static str,
}

impl<P> PinRelay<P>
where
    P: OutputPin,
    P::Error: std::error::Error + Send + Sync + 'static,
{
    /// Wrap `pin` and immediately drive it to the rest (off) level.
    pub fn new(pin: P, rest_state: RestState, name: &'static str) -> Result<Self> {
        let mut relay = Self {
            pin,
            rest_state,
            state: RelayState::Off,
            name,
        };
        relay.drive(RelayState::Off)?;
        Ok(relay)
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Whether the pin sits high for the given relay state.
    fn level_is_high(&self, state: RelayState) -> bool {
        match (self.rest_state, state) {
            (RestState::High, RelayState::Off) | (RestState::Low, RelayState::On) => true,
            (RestState::High, RelayState::On) | (RestState::Low, RelayState::Off) => false,
        }
    }

    fn drive(&mut self, state: RelayState) -> Result<()> {
        let high = self.level_is_high(state);
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.with_context(|| format!("failed to set relay pin {}", level_name(high)))?;

        Log::log_debug(&format!(
            "Relay {} (pin {})",
            state,
            level_name(high)
        ));
        self.state = state;
        Ok(())
    }
}

fn level_name(high: bool) -> &'static str {
    if high { "high" } else { "low" }
}

impl<P> Relay for PinRelay<P>
where
    P: OutputPin,
    P::Error: std::error::Error + Send + Sync + 'static,
{
    fn turn_on(&mut self) -> Result<()> {
        self.drive(RelayState::On)
    }

    fn turn_off(&mut self) -> Result<()> {
        self.drive(RelayState::Off)
    }

    fn toggle(&mut self) -> Result<()> {
        self.drive(self.state.toggled())
    }

    fn backend_name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::rc::Rc;

    use embedded_hal::digital::{ErrorKind, ErrorType};
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Default, Clone)]
    pub struct MockPin {
        pub states: Rc<RefCell<Vec<bool>>>,
    }

    impl MockPin {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_states(&self) -> Vec<bool> {
            self.states.borrow().clone()
        }
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.states.borrow_mut().push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.states.borrow_mut().push(true);
            Ok(())
        }
    }

    #[derive(Debug, Error)]
    #[error("line 4 is held by another consumer")]
    struct LineBusy;

    impl embedded_hal::digital::Error for LineBusy {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = LineBusy;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(LineBusy)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(LineBusy)
        }
    }

    #[test]
    fn test_rest_high_polarity() {
        let pin = MockPin::new();
        let mut relay = PinRelay::new(pin.clone(), RestState::High, "mock").unwrap();

        relay.turn_on().unwrap();
        relay.turn_off().unwrap();

        // Rest level first, then active-low on, then back to rest
        assert_eq!(pin.get_states(), vec![true, false, true]);
    }

    #[test]
    fn test_rest_low_polarity() {
        let pin = MockPin::new();
        let mut relay = PinRelay::new(pin.clone(), RestState::Low, "mock").unwrap();

        relay.turn_on().unwrap();

        assert_eq!(pin.get_states(), vec![false, true]);
        assert_eq!(relay.state(), RelayState::On);
    }

    #[test]
    fn test_toggle_tracks_state() {
        let pin = MockPin::new();
        let mut relay = PinRelay::new(pin.clone(), RestState::High, "mock").unwrap();

        relay.toggle().unwrap();
        assert_eq!(relay.state(), RelayState::On);
        relay.toggle().unwrap();
        assert_eq!(relay.state(), RelayState::Off);

        assert_eq!(pin.get_states(), vec![true, false, true]);
    }

    #[test]
    fn test_idempotent_commands() {
        let pin = MockPin::new();
        let mut relay = PinRelay::new(pin.clone(), RestState::High, "mock").unwrap();

        relay.turn_on().unwrap();
        relay.turn_on().unwrap();
        assert_eq!(relay.state(), RelayState::On);
        assert_eq!(pin.get_states(), vec![true, false, false]);
    }

    #[test]
    fn test_pin_failure_surfaces() {
        let err = match PinRelay::new(BrokenPin, RestState::High, "broken") {
            Ok(_) => panic!("broken pin should fail"),
            Err(e) => e,
        };
        assert_eq!(
            format!("{:#}", err),
            "failed to set relay pin high: line 4 is held by another consumer"
        );
        assert!(err.downcast_ref::<LineBusy>().is_some());
    }
}
