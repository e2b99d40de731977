//! Number extractor: turns free text into a sorted set of distinct integers.
//!
//! A number is a maximal run of ASCII digits (`0-9`). Signs, decimal points,
//! and grouping separators are not part of a run, so `"-3.50"` yields 3 and 50.
//! Leading zeros are dropped by parsing (`"007"` is 7).

use bibtag_core::{BibError, NumberSet};
use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// Every digit run in `text`, in order of appearance, duplicates included.
pub fn digit_runs(text: &str) -> impl Iterator<Item = &str> {
    DIGIT_RUN_RE.find_iter(text).map(|m| m.as_str())
}

/// Extract the set of integers printed in `text`.
///
/// Run this on the fully joined detector text, never per fragment, or a
/// number split across two fragments would be counted twice.
/// A run too large for `u64` is an error rather than a truncated value.
pub fn extract_numbers(text: &str) -> Result<NumberSet, BibError> {
    let mut numbers = NumberSet::new();
    for run in digit_runs(text) {
        let value = run
            .parse::<u64>()
            .map_err(|_| BibError::NumberOverflow(run.to_string()))?;
        numbers.insert(value);
    }
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_empty_set() {
        assert!(extract_numbers("").unwrap().is_empty());
        assert!(extract_numbers("no digits here").unwrap().is_empty());
    }

    #[test]
    fn deduplicates_and_sorts() {
        let set = extract_numbers("5 cat 5 dog 2").unwrap();
        assert_eq!(set.to_vec(), vec![2, 5]);
    }

    #[test]
    fn whole_run_is_one_number() {
        assert_eq!(extract_numbers("year2024!").unwrap().to_vec(), vec![2024]);
        assert_eq!(extract_numbers("runner #42 lane 7").unwrap().to_vec(), vec![7, 42]);
    }

    #[test]
    fn separators_split_runs() {
        assert_eq!(extract_numbers("-3.50").unwrap().to_vec(), vec![3, 50]);
        assert_eq!(extract_numbers("1,234").unwrap().to_vec(), vec![1, 234]);
    }

    #[test]
    fn leading_zeros_are_dropped() {
        assert_eq!(extract_numbers("bib 007 and 7").unwrap().to_vec(), vec![7]);
        assert_eq!(extract_numbers("000").unwrap().to_vec(), vec![0]);
    }

    #[test]
    fn overflow_is_reported() {
        let err = extract_numbers("id 99999999999999999999 ok").unwrap_err();
        assert!(matches!(err, BibError::NumberOverflow(ref run) if run == "99999999999999999999"));
        assert_eq!(
            extract_numbers(&u64::MAX.to_string()).unwrap().to_vec(),
            vec![u64::MAX]
        );
    }

    #[test]
    fn non_ascii_digits_are_not_numbers() {
        assert!(extract_numbers("٣٤ ４２").unwrap().is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "Bibs: 1203, 88, 1203 and 4";
        assert_eq!(extract_numbers(text).unwrap(), extract_numbers(text).unwrap());
    }

    #[test]
    fn digit_runs_keep_order_and_duplicates() {
        let runs: Vec<_> = digit_runs("9a9b10").collect();
        assert_eq!(runs, vec!["9", "9", "10"]);
    }
}
