//! Request handling for the Vidcast media-browsing plugin.
//!
//! The host invokes the plugin once per user action with a query string and
//! owns everything around it: rendering, playback, settings storage. This
//! crate turns one such request into one reply:
//! - a listing of navigation nodes, each carrying a self-link the host
//!   replays later,
//! - a single resolved playable stream,
//! - a shuffled playback queue, or
//! - a settings mutation acknowledgement.
//!
//! Nothing survives the invocation; persistence happens only through the
//! host's settings store behind [`vidcast_core::SettingsStore`].

pub mod nodes;
pub mod playback;
pub mod protocol;
pub mod ranker;
pub mod router;

pub use nodes::{NodeOutcome, SkipReason};
pub use playback::{reveal_subtitles, PlaybackEngine};
pub use protocol::{render, EntryAction, HostReply, ListingEntry, PlayableEntry, PROTOCOL_VERSION};
pub use ranker::select_best_file;
pub use router::{HandlerError, Outcome, Router};
