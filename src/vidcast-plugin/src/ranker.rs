//! Choosing the best playable file from a media item's encodings.

use vidcast_catalog::models::MediaFile;
use vidcast_core::RankingPreferences;

/// Any file at or under the user's resolution cap outranks every file over
/// it; the cap is a cliff, not a gradient. An over-cap file still scores its
/// base rank so it can win when nothing in-cap exists.
const IN_CAP_BONUS: i64 = 200;

/// Matching the burned-in subtitle preference outranks any in-cap
/// resolution difference, but never the cap itself.
const SUBTITLE_MATCH_BONUS: i64 = 100;

/// Pick the most suitable file for the given preferences.
///
/// Deterministic: the highest score wins and the earliest candidate wins
/// ties. `None` only for an empty candidate list.
pub fn select_best_file<'a>(
    files: &'a [MediaFile],
    prefs: &RankingPreferences,
) -> Option<&'a MediaFile> {
    let mut best: Option<(i64, &MediaFile)> = None;
    for file in files {
        let height = file.resolution_height().unwrap_or(0);
        let mut score = i64::from(height / 10);
        if height > 0 && height <= prefs.max_height {
            score += IN_CAP_BONUS;
        }
        if file.subtitled == prefs.prefer_hard_subtitles {
            score += SUBTITLE_MATCH_BONUS;
        }
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, file));
        }
    }
    best.map(|(_, file)| file)
}
