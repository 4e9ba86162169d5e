//! Property-based tests for the duplicate check, identifier rule and scrubber.

use std::collections::HashSet;

use proptest::prelude::*;
use vitals_vault::data::dedup::{DuplicateCheck, first_duplicate};
use vitals_vault::data::identifier::is_valid_identifier;
use vitals_vault::data::scrub::scrub_outliers;
use vitals_vault::ScrubConfig;

/// Readings in [1, 2]: every window mean is at least 1, so nothing can exceed 3x it.
fn spike_free_readings() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..=2.0, 0..64)
}

fn noise_char() -> impl Strategy<Value = char> {
    prop::sample::select(vec![' ', '-', '_', '.', ',', '!', ':', '#'])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn distinct_values_always_verify(values in prop::collection::hash_set(any::<i64>(), 0..64)) {
        let values: Vec<i64> = values.into_iter().collect();
        prop_assert_eq!(first_duplicate(values), DuplicateCheck::Verified);
    }

    #[test]
    fn reports_first_value_already_seen(values in prop::collection::vec(0i64..10, 0..40)) {
        let mut seen = HashSet::new();
        let expected = values.iter().copied().find(|v| !seen.insert(*v));
        let got = first_duplicate(values.iter().copied());
        match expected {
            Some(v) => prop_assert_eq!(got, DuplicateCheck::Duplicate(v)),
            None => prop_assert_eq!(got, DuplicateCheck::Verified),
        }
    }

    #[test]
    fn mirrored_identifiers_validate(stem in "[a-zA-Z0-9]{0,12}", middle in "[a-z0-9]?") {
        let tail: String = stem.chars().rev().collect();
        let id = format!("{stem}{middle}{tail}");
        prop_assert!(is_valid_identifier(&id));
    }

    #[test]
    fn validation_ignores_case_and_punctuation(
        stem in "[a-z0-9]{0,12}",
        noise in prop::collection::vec(noise_char(), 0..6),
        insert_at in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let tail: String = stem.chars().rev().collect();
        let base = format!("{stem}{tail}");
        let mut chars: Vec<char> = base.to_uppercase().chars().collect();
        for (c, at) in noise.iter().zip(insert_at.iter()) {
            let pos = at.index(chars.len() + 1);
            chars.insert(pos, *c);
        }
        let noisy: String = chars.into_iter().collect();
        prop_assert_eq!(is_valid_identifier(&noisy), is_valid_identifier(&base));
    }

    #[test]
    fn scrub_is_idempotent_without_spikes(readings in spike_free_readings()) {
        let config = ScrubConfig::default();
        let once = scrub_outliers(&readings, &config);
        let twice = scrub_outliers(&once, &config);
        prop_assert_eq!(&once, &readings);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn scrub_keeps_seed_prefix(readings in prop::collection::vec(-1e6f64..1e6, 3..64)) {
        let cleaned = scrub_outliers(&readings, &ScrubConfig::default());
        prop_assert!(cleaned.len() >= 3);
        prop_assert_eq!(&cleaned[..3], &readings[..3]);
    }

    #[test]
    fn scrub_output_is_an_ordered_subsequence(readings in prop::collection::vec(0.0f64..100.0, 0..64)) {
        let cleaned = scrub_outliers(&readings, &ScrubConfig::default());
        let mut rest = readings.iter();
        for v in &cleaned {
            prop_assert!(rest.any(|r| r == v), "{} not found in order", v);
        }
    }
}

#[test]
fn sample_identifiers() {
    assert!(is_valid_identifier("A man a plan a canal Panama"));
    assert!(!is_valid_identifier("abc"));
}
