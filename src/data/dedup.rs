use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

/// Result of a first-duplicate scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum DuplicateCheck<T> {
    Duplicate(T),
    Verified,
}

impl<T: fmt::Display> fmt::Display for DuplicateCheck<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateCheck::Duplicate(v) => write!(f, "Duplicate detected: {v}"),
            DuplicateCheck::Verified => write!(f, "Data integrity verified. No duplicates found."),
        }
    }
}

/// Return the first value that repeats an earlier one, scanning left to right.
///
/// `[1, 2, 3, 2, 1]` reports `2`: it is the first element whose value was
/// already seen, even though `1` appeared earlier in the input.
pub fn first_duplicate<T, I>(values: I) -> DuplicateCheck<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let values = values.into_iter();
    let mut seen: HashSet<T> = HashSet::with_capacity(values.size_hint().0);
    for v in values {
        if seen.contains(&v) {
            return DuplicateCheck::Duplicate(v);
        }
        seen.insert(v);
    }
    DuplicateCheck::Verified
}
