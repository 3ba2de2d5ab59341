//! Canonical numeric strings never lose digits and are stable under re-application.

use cursorpage::numeric::{canonical_decimal, canonicalize};
use proptest::prelude::*;
use serde_json::Value;

fn number(literal: &str) -> Value {
    serde_json::from_str(literal).unwrap()
}

proptest! {
    #[test]
    fn test_integers_keep_every_digit(n in any::<u128>(), negative in any::<bool>()) {
        let literal = if negative && n != 0 { format!("-{}", n) } else { n.to_string() };
        prop_assert_eq!(canonicalize(&number(&literal)), Value::String(literal));
    }

    #[test]
    fn test_trailing_fraction_zeros_are_dropped(
        int in 0u64..1_000_000_000,
        frac in "[0-9]{0,12}[1-9]",
        zeros in 0usize..8,
    ) {
        let literal = format!("{}.{}{}", int, frac, "0".repeat(zeros));
        let expected = format!("{}.{}", int, frac);
        prop_assert_eq!(canonical_decimal(&literal), Some(expected));
    }

    #[test]
    fn test_exponent_form_matches_plain_form(mantissa in 1u64..1_000_000, exponent in 0i64..30) {
        let plain = format!("{}{}", mantissa, "0".repeat(exponent as usize));
        let literal = format!("{}e{}", mantissa, exponent);
        prop_assert_eq!(canonical_decimal(&literal), canonical_decimal(&plain));
    }

    #[test]
    fn test_canonicalization_is_idempotent(
        fragments in proptest::collection::vec(
            prop_oneof![
                any::<i64>().prop_map(|n| n.to_string()),
                (any::<u32>(), 0u32..1000).prop_map(|(a, b)| format!("{}.{:03}", a, b)),
                (1u32..1000, -20i32..20).prop_map(|(m, e)| format!("{}E{}", m, e)),
                "[a-z0-9x.]{0,10}".prop_map(|s| serde_json::to_string(&s).unwrap()),
            ],
            0..10,
        )
    ) {
        let doc: Value = serde_json::from_str(&format!("[{}]", fragments.join(","))).unwrap();

        let once = canonicalize(&doc);
        prop_assert_eq!(canonicalize(&once), once.clone());
        prop_assert!(once.as_array().unwrap().iter().all(Value::is_string));
    }
}
