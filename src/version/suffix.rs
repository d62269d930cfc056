//! Incremental version suffixes.
//!
//! A suffixed version has the shape `<base>-<suffix>-<counter>`, where the counter is a
//! zero-padded decimal number. Each alignment of the same base version bumps the counter by
//! one, so successive builds of one release stay distinguishable and ordered.

use regex::Regex;
use std::cmp::Ordering;

/// Compute the next suffixed version of `original`.
///
/// When `original` already ends in `-<suffix>-<digits>`, the counter is incremented.
/// Anything else, including a version carrying a *different* suffix token, is treated as
/// unsuffixed and gets a counter of 1. The counter is left-padded with zeros to at least
/// `padding` digits and is never truncated.
///
/// # Examples
///
/// ```rust
/// use depalign_cli::version::next_version;
///
/// assert_eq!(next_version("1.2.3", "acme", 3), "1.2.3-acme-001");
/// assert_eq!(next_version("1.2.3-acme-002", "acme", 3), "1.2.3-acme-003");
/// assert_eq!(next_version("5.3.7.Final-redhat-00009", "redhat", 5), "5.3.7.Final-redhat-00010");
/// assert_eq!(next_version("1.0-other-7", "redhat", 5), "1.0-other-7-redhat-00001");
/// ```
#[must_use]
pub fn next_version(original: &str, suffix: &str, padding: usize) -> String {
    next_version_with_candidates(original, &[], suffix, padding)
}

/// Compute the next suffixed version of `original`, continuing from the highest counter
/// found in `original` or any of `candidates`.
///
/// A candidate only counts when it carries the same suffix on the same base version as
/// `original`. Candidates for other bases, such as a release from an older branch, are
/// ignored.
///
/// ```rust
/// use depalign_cli::version::next_version_with_candidates;
///
/// assert_eq!(next_version_with_candidates("1.0", &["1.0-acme-004"], "acme", 3), "1.0-acme-005");
/// assert_eq!(next_version_with_candidates("1.0-acme-007", &["1.0-acme-004"], "acme", 3), "1.0-acme-008");
/// assert_eq!(next_version_with_candidates("1.0", &["2.0-acme-004"], "acme", 3), "1.0-acme-001");
/// ```
#[must_use]
pub fn next_version_with_candidates(
    original: &str,
    candidates: &[&str],
    suffix: &str,
    padding: usize,
) -> String {
    let (base, own_counter) = match split_suffixed(original, suffix) {
        Some((base, counter)) => (base, Some(counter)),
        None => (original, None),
    };

    let highest = own_counter
        .into_iter()
        .chain(candidates.iter().filter_map(|candidate| {
            split_suffixed(candidate, suffix)
                .filter(|(candidate_base, _)| *candidate_base == base)
                .map(|(_, counter)| counter)
        }))
        .max_by(|a, b| compare_counters(a, b));

    match highest {
        Some(counter) => format_version(base, suffix, padding, &increment(counter)),
        None => format_version(base, suffix, padding, "1"),
    }
}

/// Numeric comparison of two ASCII digit strings of any length.
fn compare_counters(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Split `<base>-<suffix>-<digits>` into its base and counter.
fn split_suffixed<'a>(original: &'a str, suffix: &str) -> Option<(&'a str, &'a str)> {
    if suffix.is_empty() {
        return None;
    }

    let pattern = format!(r"^(.*)-{}-([0-9]+)$", regex::escape(suffix));
    // The pattern is built from an escaped literal, so compilation only fails on size limits
    let re = Regex::new(&pattern).ok()?;
    let captures = re.captures(original)?;
    let base = captures.get(1)?.as_str();
    let counter = captures.get(2)?.as_str();
    Some((base, counter))
}

/// Add one to a decimal digit string of any length.
fn increment(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let mut bytes: Vec<u8> = if trimmed.is_empty() {
        vec![b'0']
    } else {
        trimmed.as_bytes().to_vec()
    };

    for byte in bytes.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }

    let mut carried = Vec::with_capacity(bytes.len() + 1);
    carried.push(b'1');
    carried.extend_from_slice(&bytes);
    String::from_utf8_lossy(&carried).into_owned()
}

fn format_version(base: &str, suffix: &str, padding: usize, counter: &str) -> String {
    format!("{base}-{suffix}-{counter:0>padding$}")
}
