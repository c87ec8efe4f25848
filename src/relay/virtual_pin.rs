//! In-memory output pin for machines without a relay attached.

use embedded_hal::digital::{ErrorType, OutputPin};
use std::convert::Infallible;

use crate::logger::Log;

#[derive(Debug, Default)]
pub struct VirtualPin {
    number: u32,
    history: Vec<bool>,
}

impl VirtualPin {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            history: Vec::new(),
        }
    }

    /// Every level written so far, oldest first. `true` is high.
    pub fn history(&self) -> &[bool] {
        &self.history
    }

    pub fn is_high(&self) -> Option<bool> {
        self.history.last().copied()
    }

    fn set(&mut self, high: bool) {
        self.history.push(high);
        Log::log_indented(&format!(
            "Virtual pin {} -> {}",
            self.number,
            if high { "high" } else { "low" }
        ));
    }
}

impl ErrorType for VirtualPin {
    type Error = Infallible;
}

impl OutputPin for VirtualPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}
