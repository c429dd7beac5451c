use crate::request::Request;
use serde::{Deserialize, Serialize};

/// A catalog-scoped category identifier.
///
/// The catalog treats this as an opaque, case-sensitive key that is stable
/// across languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryKey(pub String);

impl CategoryKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl AsRef<str> for CategoryKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for CategoryKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A language-agnostic media item identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct MediaKey(pub String);

impl MediaKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl AsRef<str> for MediaKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MediaKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for MediaKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A catalog language code (e.g. "en", "de").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct LanguageCode(pub String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LanguageCode {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for LanguageCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A playable stream URL resolved from the catalog. The host owns playback;
/// the plugin only hands the URL over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamUrl(pub String);

impl StreamUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

impl AsRef<str> for StreamUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StreamUrl {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for StreamUrl {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Whether a media item is a video recording or an audio-only program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// A browsable folder backed by a catalog category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    /// Absent only for synthetic folders such as the search entry.
    pub key: Option<CategoryKey>,
    pub title: String,
    pub icon: Option<String>,
    pub fanart: Option<String>,
    pub description: Option<String>,
    /// Category header advertises a shuffled playback queue.
    pub streamable: bool,
    /// Follow-up request the host replays to open this folder.
    pub open: Request,
}

/// The stream chosen by the ranker for a media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    pub url: StreamUrl,
    pub size_bytes: Option<u64>,
    /// Sidecar text track, independent of burned-in subtitles.
    pub subtitles: Option<String>,
}

/// How a media node becomes playable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayTarget {
    /// The file list was in hand and the ranker already picked a stream.
    Direct(ResolvedStream),
    /// Playback goes through a `play` self-request (search hits carry no
    /// file list).
    Deferred(Request),
}

/// A playable media entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaNode {
    pub key: Option<MediaKey>,
    pub title: String,
    pub icon: Option<String>,
    pub fanart: Option<String>,
    pub description: Option<String>,
    pub kind: MediaKind,
    pub duration_seconds: Option<u32>,
    /// Publish timestamp as delivered by the catalog; never interpreted.
    pub published: Option<String>,
    /// Languages the item is available in, for the language picker.
    pub languages: Vec<LanguageCode>,
    pub target: PlayTarget,
}

/// A non-folder entry whose activation replays a request (language rows,
/// the search prompt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionNode {
    pub title: String,
    pub icon: Option<String>,
    pub request: Request,
}

/// Stand-in for an administratively hidden media item. Opening it routes
/// through `ask_hidden` so the host can gate it behind a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderNode {
    pub key: MediaKey,
    pub title: String,
    pub unlock: Request,
}

/// One entry in a listing handed back to the host.
///
/// Hidden source items never become nodes, and every variant carries a
/// resolvable target by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationNode {
    Category(CategoryNode),
    Media(MediaNode),
    Action(ActionNode),
    Gated(PlaceholderNode),
}

/// The single playable result of a `play` request, or one slot of a
/// shuffled queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub key: MediaKey,
    pub title: String,
    pub url: StreamUrl,
    pub subtitles: Option<String>,
    pub kind: MediaKind,
    pub duration_seconds: Option<u32>,
}
