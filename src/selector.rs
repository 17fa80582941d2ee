//! Deterministic selection over installation candidates
//!
//! Policy, in order:
//! 1. Only 64-bit candidates are ever selectable.
//! 2. An operator-override candidate beats everything else; among several, the
//!    highest version wins.
//! 3. Otherwise the highest-version candidate from the remaining channels wins.
//!
//! Ties on version keep the candidate encountered first. Enumeration order is
//! treated as input: stability is guaranteed here, not assumed from any catalog.

use crate::locator::{Channel, InstallationRecord};

/// Pick the authoritative installation, or `None` when no candidate qualifies.
pub fn select(candidates: &[InstallationRecord]) -> Option<&InstallationRecord> {
    highest_version(
        candidates
            .iter()
            .filter(|c| c.is_64bit && c.channel == Channel::OperatorOverride),
    )
    .or_else(|| {
        highest_version(
            candidates
                .iter()
                .filter(|c| c.is_64bit && c.channel != Channel::OperatorOverride),
        )
    })
}

/// Maximum by version, keeping the first of equals. A plain `max_by` would keep
/// the last and break tie-break stability.
fn highest_version<'a>(
    candidates: impl Iterator<Item = &'a InstallationRecord>,
) -> Option<&'a InstallationRecord> {
    candidates.fold(None, |best: Option<&InstallationRecord>, c| match best {
        Some(b) if c.version > b.version => Some(c),
        None => Some(c),
        keep => keep,
    })
}
