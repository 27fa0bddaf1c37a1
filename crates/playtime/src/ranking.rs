//! Top-N selection over playtime records.

use std::collections::HashSet;

use crate::types::GameRecord;

/// Number of games shown in a summary.
pub const TOP_GAMES: usize = 10;

/// Returns at most `limit` records ordered by descending playtime.
///
/// The sort is stable, so records with equal playtime keep their input
/// order.
pub fn rank_by_playtime(mut records: Vec<GameRecord>, limit: usize) -> Vec<GameRecord> {
    records.sort_by(|a, b| b.total_playtime_minutes.cmp(&a.total_playtime_minutes));
    records.truncate(limit);
    records
}

/// Returns at most `limit` records in the order they were reported.
pub fn take_as_reported(mut records: Vec<GameRecord>, limit: usize) -> Vec<GameRecord> {
    records.truncate(limit);
    records
}

/// Keeps only records whose app id is in `allow`. An empty allow-list keeps
/// everything.
pub fn retain_app_ids(mut records: Vec<GameRecord>, allow: &[u32]) -> Vec<GameRecord> {
    if allow.is_empty() {
        return records;
    }
    let allow: HashSet<u32> = allow.iter().copied().collect();
    records.retain(|r| allow.contains(&r.app_id));
    records
}
