mod common;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use mockall::{Sequence, mock};

use common::*;
use sunrelay::clock::WaitOutcome;
use sunrelay::geo::{Location, SolarError, SunEventSource, SunEvents};
use sunrelay::relay::Relay;
use sunrelay::scheduler::Scheduler;
use sunrelay::signals;

mock! {
    pub GpioRelay {}

    impl Relay for GpioRelay {
        fn turn_on(&mut self) -> anyhow::Result<()>;
        fn turn_off(&mut self) -> anyhow::Result<()>;
        fn toggle(&mut self) -> anyhow::Result<()>;
        fn backend_name(&self) -> &'static str;
    }
}

mock! {
    pub Source {}

    impl SunEventSource for Source {
        fn next_events(
            &self,
            location: &Location,
            now: DateTime<Utc>,
        ) -> Result<SunEvents, SolarError>;
    }
}

#[test]
fn test_relay_failure_on_first_command_is_fatal() {
    let mut relay = MockGpioRelay::new();
    relay.expect_backend_name().return_const("mock");
    relay
        .expect_turn_off()
        .times(1)
        .returning(|| Err(anyhow!("write /sys/class/gpio/gpio4/value: EIO")));
    relay.expect_turn_on().never();

    let clock = ManualClock::new(utc(2024, 6, 21, 3, 0), vec![WaitOutcome::Elapsed; 5]);
    let (_handle, shutdown) = signals::channel();

    let mut scheduler = Scheduler::new(FixedDaySource, relay, clock.clone(), test_location());
    let err = scheduler.run(&shutdown).unwrap_err();

    assert!(format!("{:#}", err).contains("Failed to switch relay off"));
    assert!(format!("{:#}", err).contains("EIO"));
    // Nothing was awaited after the failure
    assert!(clock.deadlines().is_empty());
}

#[test]
fn test_relay_failure_after_transition_is_fatal() {
    let mut seq = Sequence::new();
    let mut relay = MockGpioRelay::new();
    relay.expect_backend_name().return_const("mock");
    relay
        .expect_turn_off()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    relay
        .expect_turn_on()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Err(anyhow!("relay board unplugged")));

    let clock = ManualClock::new(utc(2024, 6, 21, 3, 0), vec![WaitOutcome::Elapsed; 5]);
    let (_handle, shutdown) = signals::channel();

    let mut scheduler = Scheduler::new(FixedDaySource, relay, clock.clone(), test_location());
    let err = scheduler.run(&shutdown).unwrap_err();

    assert!(format!("{:#}", err).contains("Failed to switch relay on"));
    assert_eq!(clock.deadlines(), vec![utc(2024, 6, 21, 6, 0)]);
}

#[test]
fn test_invalid_coordinates_are_fatal() {
    let mut source = MockSource::new();
    source.expect_next_events().times(1).returning(|_, _| {
        Err(SolarError::InvalidCoordinates {
            latitude: 91.0,
            longitude: 0.0,
        })
    });

    let clock = ManualClock::new(utc(2024, 6, 21, 3, 0), vec![WaitOutcome::Elapsed; 5]);
    let relay = RecordingRelay::new();
    let (_handle, shutdown) = signals::channel();

    let mut scheduler = Scheduler::new(source, relay.clone(), clock.clone(), test_location());
    let err = scheduler.run(&shutdown).unwrap_err();

    assert!(err.downcast_ref::<SolarError>().is_some());
    assert!(relay.commands().is_empty());
    assert!(clock.deadlines().is_empty());
}

#[test]
fn test_source_receives_clock_time() {
    let start = utc(2024, 6, 21, 3, 0);
    let mut source = MockSource::new();
    source
        .expect_next_events()
        .withf(move |_, now| *now == start)
        .times(1)
        .returning(|location, now| FixedDaySource.next_events(location, now));

    let clock = ManualClock::new(start, vec![]);
    let relay = RecordingRelay::new();
    let (_handle, shutdown) = signals::channel();

    let mut scheduler = Scheduler::new(source, relay, clock, test_location());
    scheduler.run(&shutdown).unwrap();
}
