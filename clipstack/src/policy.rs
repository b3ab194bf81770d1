//! Dedup and retention decisions
//!
//! Pure functions over the history: no I/O, no locking.

use crate::interface::{ClipboardContent, ClipboardEntry, RetentionLimits};

/// Should `candidate` be recorded on top of `head`?
///
/// Blank text is never recorded. A candidate equal to the head in both kind
/// and payload collapses into it.
pub fn should_record(candidate: &ClipboardEntry, head: Option<&ClipboardEntry>) -> bool {
    if let ClipboardContent::Text { value } = &candidate.content {
        if value.trim().is_empty() {
            return false;
        }
    }
    match head {
        Some(head) => !head.same_content(candidate),
        None => true,
    }
}

/// Apply retention limits, keeping the list order.
///
/// Age drops entries older than `max_age_ms` before the newest capture time.
/// Count then keeps the first `max_count` positions of what is left. The
/// newest entry always survives and counts toward `max_count`, so a reorder
/// that moved it past the cut costs the last position inside it.
pub fn evict(history: Vec<ClipboardEntry>, limits: &RetentionLimits) -> Vec<ClipboardEntry> {
    if limits.max_count.is_none() && limits.max_age_ms.is_none() {
        return history;
    }
    let Some(newest) = history.iter().map(|e| e.creation_time).max() else {
        return history;
    };

    let mut kept: Vec<ClipboardEntry> = match limits.max_age_ms {
        Some(age) => {
            let cutoff = newest.saturating_sub(i64::try_from(age).unwrap_or(i64::MAX));
            history
                .into_iter()
                .filter(|e| e.creation_time == newest || e.creation_time >= cutoff)
                .collect()
        }
        None => history,
    };

    if let Some(max_count) = limits.max_count.map(|n| n as usize) {
        if kept.len() > max_count {
            match kept.iter().position(|e| e.creation_time == newest) {
                Some(index) if index >= max_count => {
                    let pinned = kept.remove(index);
                    kept.truncate(max_count.saturating_sub(1));
                    kept.push(pinned);
                }
                _ => kept.truncate(max_count),
            }
        }
    }
    kept
}
