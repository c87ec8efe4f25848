//! Command-line command handlers for sunrelay.
//!
//! One-shot commands that run instead of the scheduler. Each command lives in
//! its own submodule.

pub mod next;
