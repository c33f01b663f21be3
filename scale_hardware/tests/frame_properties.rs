use proptest::prelude::*;
use scale_hardware::frame::parse;
use scale_traits::{KG_PER_LB, Unit};

fn unit_token() -> impl Strategy<Value = (String, Unit)> {
    prop_oneof![
        Just(("kg".to_string(), Unit::Kg)),
        Just(("KG".to_string(), Unit::Kg)),
        Just(("Kg".to_string(), Unit::Kg)),
        Just(("lb".to_string(), Unit::Lb)),
        Just(("LB".to_string(), Unit::Lb)),
        Just(("lB".to_string(), Unit::Lb)),
    ]
}

proptest! {
    #[test]
    fn valid_frames_normalize_to_kg(
        value in 0.0f64..10_000.0,
        (token, unit) in unit_token(),
        lead in "[ \t]{0,6}",
        gap in "[ \t]{0,3}",
        trail in "[ \t]{0,6}",
    ) {
        let line = format!("{lead}{value:.3}{gap}{token}{trail}");
        let r = parse(&line);
        let m = r.measurement.expect("frame should parse");
        let expected_raw: f64 = format!("{value:.3}").parse().unwrap();
        prop_assert_eq!(m.unit, unit);
        prop_assert!((m.value_raw - expected_raw).abs() < 1e-9);
        let expected_kg = match unit {
            Unit::Kg => expected_raw,
            Unit::Lb => expected_raw * KG_PER_LB,
        };
        prop_assert!((m.value_kg - expected_kg).abs() < 1e-6);
        prop_assert!(m.value_kg >= 0.0);
        prop_assert_eq!(r.raw_text, line);
    }

    #[test]
    fn text_without_number_and_unit_is_preserved(line in "[a-jm-zA-JM-Z ,:;!?-]{0,40}") {
        // No digits and no 'k'/'l', so no number+unit pattern can appear.
        let r = parse(&line);
        prop_assert!(!r.is_parsed());
        prop_assert_eq!(r.raw_text, line);
    }

    #[test]
    fn parse_never_panics(line in ".{0,80}") {
        let r = parse(&line);
        if let Some(m) = r.measurement {
            prop_assert!(m.value_kg.is_finite() && m.value_kg >= 0.0);
        }
    }
}
