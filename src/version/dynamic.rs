//! Dynamic version selectors.
//!
//! A dependency declared with a dynamic selector does not name one concrete version. The
//! build resolves it to a concrete coordinate, and that resolved coordinate is what gets
//! sent for alignment and, failing an aligned version, pinned in the model.
//!
//! Recognised selector kinds:
//!
//! | Kind | Examples |
//! |------|----------|
//! | sub-version | `+`, `1.+`, `1.2.+` |
//! | latest status | `latest.release`, `latest.integration` |
//! | range | `[1.0,2.0]`, `[1.0,2.0)`, `]1.0,2.0[`, `(,2.0]`, `[1.0,)` |
//!
//! Everything else is an exact version.

/// Version reported by a build for a module that has no version set.
pub const UNSPECIFIED: &str = "unspecified";

const SNAPSHOT: &str = "SNAPSHOT";

/// Whether `version` is a dynamic selector rather than an exact version.
#[must_use]
pub fn is_dynamic(version: &str) -> bool {
    let version = version.trim();
    if version.is_empty() {
        return false;
    }

    version.ends_with('+') || version.starts_with("latest.") || is_range(version)
}

fn is_range(version: &str) -> bool {
    let opens = version.starts_with(['[', '(', ']']);
    let closes = version.ends_with([']', ')', '[']);
    opens && closes && version.contains(',')
}

/// True for an empty version or the placeholder a build reports for unversioned modules.
#[must_use]
pub fn is_unspecified(version: &str) -> bool {
    let version = version.trim();
    version.is_empty() || version == UNSPECIFIED
}

/// Remove a trailing `-SNAPSHOT` or `.SNAPSHOT` marker, ignoring case.
#[must_use]
pub fn strip_snapshot(version: &str) -> &str {
    let len = version.len();
    if len <= SNAPSHOT.len() {
        return version;
    }

    let (head, tail) = version.split_at(len - SNAPSHOT.len());
    if !tail.eq_ignore_ascii_case(SNAPSHOT) {
        return version;
    }
    head.strip_suffix(['-', '.']).unwrap_or(version)
}
