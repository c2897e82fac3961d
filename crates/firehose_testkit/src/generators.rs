//! Property-based test generators using proptest.
//!
//! Provides strategies for generating records and a reference model of how
//! the byte threshold splits them into batches.

use proptest::prelude::*;

/// Strategy for a single record (arbitrary bytes, possibly empty).
pub fn record_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

/// Strategy for a single non-empty record that contains no `\n`.
pub fn line_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("no newline", |b| *b != b'\n'), 1..32)
}

/// Strategy for a sequence of records.
pub fn record_batch_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(record_strategy(), 1..48)
}

/// Strategy for a byte threshold small enough to force rotations.
pub fn max_bytes_strategy() -> impl Strategy<Value = u64> {
    1u64..256
}

/// Splits `records` into the batches a writer produces when only the byte
/// threshold applies.
///
/// A batch closes as soon as its size reaches `max_bytes`; the record that
/// crosses the threshold belongs to the batch it closes.
pub fn expected_batches(records: &[Vec<u8>], max_bytes: u64, append_newline: bool) -> Vec<Vec<u8>> {
    let mut batches = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    for record in records {
        let batch = current.get_or_insert_with(Vec::new);
        batch.extend_from_slice(record);
        if append_newline {
            batch.push(b'\n');
        }
        if batch.len() as u64 >= max_bytes {
            batches.extend(current.take());
        }
    }
    batches.extend(current);
    batches
}

/// How many cases a property test runs and how hard it shrinks failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropTestConfig {
    /// Cases per property.
    pub cases: u32,
    /// Shrink steps allowed when minimizing a failing case.
    pub max_shrink_iters: u32,
}

impl PropTestConfig {
    /// Few cases, cheap enough for every `cargo test` run.
    #[must_use]
    pub const fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 256,
        }
    }

    /// Many cases, for `#[ignore]`d soak runs.
    #[must_use]
    pub const fn thorough() -> Self {
        Self {
            cases: 2048,
            max_shrink_iters: 4096,
        }
    }

    /// Builds the proptest runner configuration, with failure persistence
    /// turned off.
    #[must_use]
    pub fn to_proptest_config(self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            failure_persistence: None,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_matches_known_example() {
        let records: Vec<Vec<u8>> = ["Niels", "Tisse", "Juna", "Alise"]
            .iter()
            .map(|r| r.as_bytes().to_vec())
            .collect();

        let batches = expected_batches(&records, 7, false);
        assert_eq!(batches, vec![b"NielsTisse".to_vec(), b"JunaAlise".to_vec()]);
    }

    #[test]
    fn thorough_runs_more_cases_than_quick() {
        let quick = PropTestConfig::quick().to_proptest_config();
        let thorough = PropTestConfig::thorough().to_proptest_config();
        assert!(thorough.cases > quick.cases);
        assert!(quick.failure_persistence.is_none());
    }

    #[test]
    fn model_trailing_partial_batch() {
        let records = vec![b"abc".to_vec(), b"d".to_vec()];
        let batches = expected_batches(&records, 3, true);
        assert_eq!(batches, vec![b"abc\n".to_vec(), b"d\n".to_vec()]);
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn line_has_no_newline(line in line_strategy()) {
            prop_assert!(!line.is_empty());
            prop_assert!(!line.contains(&b'\n'));
        }

        #[test]
        fn model_preserves_concatenation(
            records in record_batch_strategy(),
            max_bytes in max_bytes_strategy(),
        ) {
            let batches = expected_batches(&records, max_bytes, false);
            prop_assert_eq!(batches.concat(), records.concat());
        }
    }
}
