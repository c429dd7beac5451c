//! Reply types the host consumes.
//!
//! This is the boundary where follow-up requests become opaque self-link
//! URLs: the host stores each `url` verbatim and replays it as a future
//! invocation. The host renders entries however it likes; the plugin never
//! formats display widgets.

use crate::router::Outcome;
use serde::{Deserialize, Serialize};
use vidcast_core::{MediaKind, NavigationNode, PlayTarget, Request, ResolvedMedia};

/// Protocol version for compatibility checking.
pub const PROTOCOL_VERSION: u32 = 1;

/// One reply per invocation, written as a single JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostReply {
    /// A browsable page.
    Listing { items: Vec<ListingEntry> },
    /// The resolved playable target of a `play` request.
    Resolved { item: PlayableEntry },
    /// A shuffled playback queue, in play order.
    Queue { items: Vec<PlayableEntry> },
    /// A settings mutation with nothing to display.
    Updated,
    /// A hard failure; the host shows one notification and stops.
    Error { message: String },
}

/// One row of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingEntry {
    pub title: String,
    /// Self-link to replay, or the direct stream URL when `playable`.
    pub url: String,
    pub folder: bool,
    pub playable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fanart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<String>,
    /// Languages the item is known to be available in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// Secondary self-links (shuffle, language picker, undubbed audio).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<EntryAction>,
}

/// A labeled secondary self-link on a listing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryAction {
    pub title: String,
    pub url: String,
}

/// A playable result or queue slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayableEntry {
    pub title: String,
    pub url: String,
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<String>,
}

/// Encode an outcome for the host, binding every follow-up request to the
/// plugin entrypoint.
pub fn render(outcome: &Outcome, entry: &str) -> HostReply {
    match outcome {
        Outcome::Listing(nodes) => HostReply::Listing {
            items: nodes.iter().map(|node| listing_entry(node, entry)).collect(),
        },
        Outcome::Resolved(media) => HostReply::Resolved {
            item: playable_entry(media),
        },
        Outcome::Queue(queue) => HostReply::Queue {
            items: queue.iter().map(playable_entry).collect(),
        },
        Outcome::Updated => HostReply::Updated,
    }
}

fn listing_entry(node: &NavigationNode, entry: &str) -> ListingEntry {
    match node {
        NavigationNode::Category(category) => {
            let mut actions = Vec::new();
            if category.streamable {
                if let Some(key) = &category.key {
                    actions.push(EntryAction {
                        title: "Shuffle".to_owned(),
                        url: Request::stream(key).to_url(entry),
                    });
                }
            }
            ListingEntry {
                title: category.title.clone(),
                url: category.open.to_url(entry),
                folder: true,
                playable: false,
                kind: None,
                icon: category.icon.clone(),
                fanart: category.fanart.clone(),
                description: category.description.clone(),
                duration_seconds: None,
                size_bytes: None,
                published: None,
                subtitles: None,
                languages: Vec::new(),
                actions,
            }
        }
        NavigationNode::Media(media) => {
            let (url, size_bytes, subtitles) = match &media.target {
                PlayTarget::Direct(stream) => (
                    stream.url.as_ref().to_owned(),
                    stream.size_bytes,
                    stream.subtitles.clone(),
                ),
                PlayTarget::Deferred(request) => (request.to_url(entry), None, None),
            };
            let mut actions = Vec::new();
            if let Some(key) = &media.key {
                actions.push(EntryAction {
                    title: "Audio languages".to_owned(),
                    url: Request::languages(Some(key)).to_url(entry),
                });
                if subtitles.is_some() {
                    actions.push(EntryAction {
                        title: "Undubbed audio".to_owned(),
                        url: Request::play_undubbed(key).to_url(entry),
                    });
                }
            }
            ListingEntry {
                title: media.title.clone(),
                url,
                folder: false,
                playable: true,
                kind: Some(media.kind),
                icon: media.icon.clone(),
                fanart: media.fanart.clone(),
                description: media.description.clone(),
                duration_seconds: media.duration_seconds,
                size_bytes,
                published: media.published.clone(),
                subtitles,
                languages: media
                    .languages
                    .iter()
                    .map(|code| code.as_ref().to_owned())
                    .collect(),
                actions,
            }
        }
        NavigationNode::Action(action) => ListingEntry {
            title: action.title.clone(),
            url: action.request.to_url(entry),
            folder: false,
            playable: false,
            kind: None,
            icon: action.icon.clone(),
            fanart: None,
            description: None,
            duration_seconds: None,
            size_bytes: None,
            published: None,
            subtitles: None,
            languages: Vec::new(),
            actions: Vec::new(),
        },
        NavigationNode::Gated(placeholder) => ListingEntry {
            title: placeholder.title.clone(),
            url: placeholder.unlock.to_url(entry),
            folder: true,
            playable: false,
            kind: None,
            icon: None,
            fanart: None,
            description: None,
            duration_seconds: None,
            size_bytes: None,
            published: None,
            subtitles: None,
            languages: Vec::new(),
            actions: Vec::new(),
        },
    }
}

fn playable_entry(media: &ResolvedMedia) -> PlayableEntry {
    PlayableEntry {
        title: media.title.clone(),
        url: media.url.as_ref().to_owned(),
        kind: media.kind,
        duration_seconds: media.duration_seconds,
        subtitles: media.subtitles.clone(),
    }
}
