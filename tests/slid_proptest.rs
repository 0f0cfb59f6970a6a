//! Property-based tests for SLID canonicalization.

use proptest::prelude::*;

use sip_attestation::Slid36;

/// Strategies for spelling the same SLID in different ways.
mod strategies {
    use super::*;

    /// Upper- or lower-cases each letter independently.
    pub fn mixed_case(canonical: String) -> impl Strategy<Value = String> {
        let len = canonical.len();
        prop::collection::vec(any::<bool>(), len).prop_map(move |flips| {
            canonical
                .chars()
                .zip(flips)
                .map(|(c, lower)| if lower { c.to_ascii_lowercase() } else { c })
                .collect()
        })
    }

    /// A positive i64 together with a differently spelled base-36 rendering.
    pub fn spelled_slid() -> impl Strategy<Value = (u64, String)> {
        (1..=i64::MAX, 0..4usize, any::<bool>()).prop_flat_map(|(value, zeros, plus)| {
            mixed_case(to_base36(value.unsigned_abs())).prop_map(move |spelled| {
                let sign = if plus { "+" } else { "" };
                (value.unsigned_abs(), format!("{sign}{}{spelled}", "0".repeat(zeros)))
            })
        })
    }

    pub fn to_base36(mut value: u64) -> String {
        const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let mut out = Vec::new();
        while value > 0 {
            out.push(DIGITS[usize::try_from(value % 36).unwrap()]);
            value /= 36;
        }
        out.reverse();
        String::from_utf8(out).unwrap()
    }
}

proptest! {
    #[test]
    fn spellings_canonicalize_to_one_value((value, spelled) in strategies::spelled_slid()) {
        let slid = Slid36::parse(&spelled).unwrap();
        prop_assert_eq!(slid.value(), value);
        prop_assert_eq!(slid.as_str(), strategies::to_base36(value));
    }

    #[test]
    fn canonicalization_is_idempotent(value in 1..=i64::MAX) {
        let once = Slid36::parse(&strategies::to_base36(value.unsigned_abs())).unwrap();
        let twice = Slid36::parse(once.as_str()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn canonical_form_is_uppercase_without_leading_zeros(value in 1..=i64::MAX) {
        let slid = Slid36::parse(&strategies::to_base36(value.unsigned_abs()).to_lowercase()).unwrap();
        prop_assert!(!slid.as_str().starts_with('0'));
        prop_assert!(slid.as_str().chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn non_positive_values_are_rejected(value in i64::MIN..=0) {
        let rendered = if value == 0 {
            "0".to_string()
        } else {
            format!("-{}", strategies::to_base36(value.unsigned_abs()))
        };
        prop_assert!(Slid36::parse(&rendered).is_err());
    }

    #[test]
    fn parse_never_panics(s in "\\PC*") {
        let _ = Slid36::parse(&s);
    }
}
