use proptest::prelude::*;
use sunrelay::config::{Backend, Config, RestState, validate_config};
use sunrelay::constants::*;

fn backend_strategy() -> impl Strategy<Value = Option<Backend>> {
    prop_oneof![Just(None), Just(Some(Backend::Gpio)), Just(Some(Backend::Virtual))]
}

fn rest_state_strategy() -> impl Strategy<Value = Option<RestState>> {
    prop_oneof![
        Just(None),
        Just(Some(RestState::High)),
        Just(Some(RestState::Low))
    ]
}

/// Configurations whose every value lies inside the accepted ranges
fn valid_config_strategy() -> impl Strategy<Value = Config> {
    (
        MINIMUM_LATITUDE..=MAXIMUM_LATITUDE,
        MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE,
        prop::option::of(MINIMUM_ELEVATION..=MAXIMUM_ELEVATION),
        prop::option::of(0..=MAXIMUM_RELAY_PIN),
        rest_state_strategy(),
        backend_strategy(),
        prop::option::of(MINIMUM_RETRY_INTERVAL..=MAXIMUM_RETRY_INTERVAL),
    )
        .prop_map(
            |(latitude, longitude, elevation, relay_pin, rest_state, backend, retry_interval)| {
                Config {
                    latitude: Some(latitude),
                    longitude: Some(longitude),
                    elevation,
                    relay_pin,
                    rest_state,
                    backend,
                    retry_interval,
                }
            },
        )
}

proptest! {
    #[test]
    fn test_in_range_configs_validate(config in valid_config_strategy()) {
        prop_assert!(validate_config(&config).is_ok());
        prop_assert!(config.location().is_ok());
    }

    #[test]
    fn test_out_of_range_latitude_rejected(
        mut config in valid_config_strategy(),
        excess in 0.001f64..1000.0,
        south in any::<bool>()
    ) {
        config.latitude = Some(if south {
            MINIMUM_LATITUDE - excess
        } else {
            MAXIMUM_LATITUDE + excess
        });
        prop_assert!(validate_config(&config).is_err());
        prop_assert!(config.location().is_err());
    }

    #[test]
    fn test_out_of_range_longitude_rejected(
        mut config in valid_config_strategy(),
        excess in 0.001f64..1000.0,
        west in any::<bool>()
    ) {
        config.longitude = Some(if west {
            MINIMUM_LONGITUDE - excess
        } else {
            MAXIMUM_LONGITUDE + excess
        });
        prop_assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_out_of_range_retry_interval_rejected(
        mut config in valid_config_strategy(),
        interval in prop_oneof![0..MINIMUM_RETRY_INTERVAL, (MAXIMUM_RETRY_INTERVAL + 1)..u64::MAX]
    ) {
        config.retry_interval = Some(interval);
        prop_assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_out_of_range_relay_pin_rejected(
        mut config in valid_config_strategy(),
        pin in (MAXIMUM_RELAY_PIN + 1)..=u32::MAX
    ) {
        config.relay_pin = Some(pin);
        prop_assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_accessors_fall_back_to_defaults(config in valid_config_strategy()) {
        prop_assert_eq!(config.relay_pin(), config.relay_pin.unwrap_or(DEFAULT_RELAY_PIN));
        prop_assert_eq!(config.backend(), config.backend.unwrap_or(DEFAULT_BACKEND));
        prop_assert_eq!(config.rest_state(), config.rest_state.unwrap_or(DEFAULT_REST_STATE));
        prop_assert_eq!(
            config.retry_interval().as_secs(),
            config.retry_interval.unwrap_or(DEFAULT_RETRY_INTERVAL)
        );
    }
}
