//! Bridge to the host playback engine.
//!
//! Stream initialization is asynchronous on the host side: right after
//! playback starts the engine may not have parsed any subtitle tracks yet.
//! The bridge polls a bounded number of times and gives up quietly.

use std::time::Duration;

pub const SUBTITLE_POLL_ATTEMPTS: u32 = 10;
pub const SUBTITLE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The slice of the host player the plugin needs.
pub trait PlaybackEngine {
    /// Subtitle tracks the current stream has exposed so far.
    fn subtitle_track_count(&self) -> usize;
    /// Toggle subtitle display.
    fn show_subtitles(&mut self, visible: bool);
}

/// Turn subtitle display on as soon as the engine reports a track.
///
/// Polls up to `attempts` times, sleeping `interval` between checks, and
/// returns whether a track appeared within the budget.
pub async fn reveal_subtitles(
    engine: &mut dyn PlaybackEngine,
    attempts: u32,
    interval: Duration,
) -> bool {
    for _ in 0..attempts {
        if engine.subtitle_track_count() > 0 {
            engine.show_subtitles(true);
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    tracing::warn!("no subtitle tracks appeared, leaving display unchanged");
    false
}
