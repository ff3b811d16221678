use ecusim::signals::FRAME_DLC;
use ecusim::{FrameGenerator, NodeConfig, SignalKind};

fn seeded_generator(seed: u64) -> FrameGenerator {
    FrameGenerator::with_seed(&NodeConfig::default(), seed)
}

#[cfg(test)]
mod walk_invariant_tests {
    use super::*;

    #[test]
    fn test_values_stay_inside_declared_ranges() {
        let mut generator = seeded_generator(7);

        for _ in 0..2000 {
            for kind in SignalKind::ALL {
                generator.next(kind);
                let spec = kind.spec();
                let value = generator.value(kind);
                assert!(
                    value >= spec.min && value <= spec.max,
                    "{} left its range: {}",
                    kind.name(),
                    value
                );
            }
        }
    }

    #[test]
    fn test_consecutive_values_respect_step_bounds() {
        let mut generator = seeded_generator(11);

        for kind in SignalKind::ALL {
            let spec = kind.spec();
            let bound = spec.step_up.max(-spec.step_down);
            let mut previous = generator.value(kind);
            for _ in 0..500 {
                generator.next(kind);
                let current = generator.value(kind);
                assert!(
                    (current - previous).abs() <= bound,
                    "{} jumped from {} to {}",
                    kind.name(),
                    previous,
                    current
                );
                previous = current;
            }
        }
    }

    #[test]
    fn test_fuel_level_never_increases() {
        let mut generator = seeded_generator(13);

        let mut previous = generator.value(SignalKind::FuelLevel);
        for _ in 0..1000 {
            generator.next(SignalKind::FuelLevel);
            let current = generator.value(SignalKind::FuelLevel);
            assert!(current <= previous, "fuel refilled: {} -> {}", previous, current);
            previous = current;
        }
    }

    #[test]
    fn test_signal_streams_are_independent() {
        let mut generator = seeded_generator(17);

        // Draining fuel must not disturb any other signal's state.
        let engine_before = generator.value(SignalKind::EngineSpeed);
        for _ in 0..50 {
            generator.next(SignalKind::FuelLevel);
        }
        assert_eq!(generator.value(SignalKind::EngineSpeed), engine_before);
    }

    #[test]
    fn test_two_nodes_do_not_interfere() {
        let mut first = seeded_generator(19);
        let mut second = seeded_generator(23);

        first.set_value(SignalKind::VehicleSpeed, 120);
        for _ in 0..100 {
            second.next(SignalKind::VehicleSpeed);
        }
        assert_eq!(first.value(SignalKind::VehicleSpeed), 120);
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_engine_speed_step_encodes_to_payload() {
        let mut generator = seeded_generator(1);
        generator.set_value(SignalKind::EngineSpeed, 1500);

        let frame = generator.step(SignalKind::EngineSpeed, 200);

        assert_eq!(frame.can_id, 0x100);
        assert_eq!(frame.dlc as usize, FRAME_DLC);
        let rpm = (u16::from(frame.data[0]) << 8) | u16::from(frame.data[1]);
        assert_eq!(rpm, 1700);
    }

    #[test]
    fn test_engine_speed_saturates_at_redline() {
        let mut generator = seeded_generator(2);
        generator.set_value(SignalKind::EngineSpeed, 1500);

        for _ in 0..40 {
            generator.step(SignalKind::EngineSpeed, 200);
        }
        assert_eq!(generator.value(SignalKind::EngineSpeed), 6000);

        // Further worst-case draws stay pinned at the ceiling.
        let frame = generator.step(SignalKind::EngineSpeed, 200);
        assert_eq!(generator.value(SignalKind::EngineSpeed), 6000);
        assert_eq!(
            SignalKind::EngineSpeed.decode(&frame.data),
            Some(6000)
        );
    }

    #[test]
    fn test_fuel_level_drains_to_floor_and_holds() {
        let mut generator = seeded_generator(3);
        generator.set_value(SignalKind::FuelLevel, 180);

        for _ in 0..200 {
            generator.step(SignalKind::FuelLevel, -1);
        }
        assert_eq!(generator.value(SignalKind::FuelLevel), 20);

        for _ in 0..50 {
            generator.step(SignalKind::FuelLevel, -1);
        }
        assert_eq!(generator.value(SignalKind::FuelLevel), 20);
    }

    #[test]
    fn test_coolant_payload_carries_offset_value() {
        let mut generator = seeded_generator(4);
        generator.set_value(SignalKind::CoolantTemp, 90);

        let frame = generator.step(SignalKind::CoolantTemp, 0);
        assert_eq!(frame.data[0], 130);
        assert_eq!(SignalKind::CoolantTemp.decode(&frame.data), Some(90));
    }

    #[test]
    fn test_set_value_clamps_to_range() {
        let mut generator = seeded_generator(5);

        generator.set_value(SignalKind::BatteryVoltage, 500);
        assert_eq!(generator.value(SignalKind::BatteryVoltage), 145);

        generator.set_value(SignalKind::BatteryVoltage, 0);
        assert_eq!(generator.value(SignalKind::BatteryVoltage), 120);
    }

    #[test]
    fn test_initial_values_match_catalogue() {
        let generator = seeded_generator(6);
        for kind in SignalKind::ALL {
            assert_eq!(generator.value(kind), kind.spec().initial);
        }
    }
}
