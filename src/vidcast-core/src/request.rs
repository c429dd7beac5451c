//! Self-referential request values and their query-string codec.
//!
//! The plugin is a single-shot process: every navigable entry it emits
//! carries an encoded follow-up request bound to the plugin's own
//! entrypoint. The host stores that string verbatim and replays it when the
//! user acts on the entry, which is the only navigation state there is.

use crate::models::{CategoryKey, LanguageCode, MediaKey};
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Well-known query parameter names.
pub mod keys {
    pub const MODE: &str = "mode";
    pub const CATEGORY: &str = "category";
    pub const MEDIA: &str = "media";
    pub const LANGUAGE: &str = "language";
    pub const QUERY: &str = "query";
}

/// Old persisted links use the bare mode string `Streaming<key>`; anything
/// with this prefix (except the bare token) is a shuffle request.
pub const LEGACY_STREAM_PREFIX: &str = "Streaming";

/// The page a request addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mode {
    /// No `mode` parameter: the top-level category listing.
    Root,
    Browse,
    Play,
    /// Play the reference-language audio while keeping localized subtitles.
    PlayUndubbed,
    Languages,
    SetLanguage,
    Search,
    AskHidden,
    Stream,
    /// Unrecognized mode string; the router applies the fallback rules.
    Legacy(String),
}

impl Mode {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Mode::Root,
            Some("browse") => Mode::Browse,
            Some("play") => Mode::Play,
            Some("play_undubbed") => Mode::PlayUndubbed,
            Some("languages") => Mode::Languages,
            Some("set_language") => Mode::SetLanguage,
            Some("search") => Mode::Search,
            Some("ask_hidden") => Mode::AskHidden,
            Some("stream") => Mode::Stream,
            Some(other) => Mode::Legacy(other.to_owned()),
        }
    }

    /// The wire spelling; `None` for the root page.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Mode::Root => None,
            Mode::Browse => Some("browse"),
            Mode::Play => Some("play"),
            Mode::PlayUndubbed => Some("play_undubbed"),
            Mode::Languages => Some("languages"),
            Mode::SetLanguage => Some("set_language"),
            Mode::Search => Some("search"),
            Mode::AskHidden => Some("ask_hidden"),
            Mode::Stream => Some("stream"),
            Mode::Legacy(raw) => Some(raw),
        }
    }
}

/// One plugin invocation: a mode plus single-valued string parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub mode: Mode,
    pub params: BTreeMap<String, String>,
}

impl Request {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_owned(), value.into());
        self
    }

    pub fn root() -> Self {
        Self::new(Mode::Root)
    }

    pub fn browse(key: &CategoryKey) -> Self {
        Self::new(Mode::Browse).with_param(keys::CATEGORY, key.as_ref())
    }

    pub fn play(key: &MediaKey, language: Option<&LanguageCode>) -> Self {
        let request = Self::new(Mode::Play).with_param(keys::MEDIA, key.as_ref());
        match language {
            Some(code) => request.with_param(keys::LANGUAGE, code.as_ref()),
            None => request,
        }
    }

    pub fn play_undubbed(key: &MediaKey) -> Self {
        Self::new(Mode::PlayUndubbed).with_param(keys::MEDIA, key.as_ref())
    }

    pub fn languages(media: Option<&MediaKey>) -> Self {
        let request = Self::new(Mode::Languages);
        match media {
            Some(key) => request.with_param(keys::MEDIA, key.as_ref()),
            None => request,
        }
    }

    pub fn set_language(code: &LanguageCode) -> Self {
        Self::new(Mode::SetLanguage).with_param(keys::LANGUAGE, code.as_ref())
    }

    pub fn search() -> Self {
        Self::new(Mode::Search)
    }

    pub fn ask_hidden(key: &MediaKey) -> Self {
        Self::new(Mode::AskHidden).with_param(keys::MEDIA, key.as_ref())
    }

    pub fn stream(key: &CategoryKey) -> Self {
        Self::new(Mode::Stream).with_param(keys::CATEGORY, key.as_ref())
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn category(&self) -> Option<&str> {
        self.param(keys::CATEGORY)
    }

    pub fn media(&self) -> Option<&str> {
        self.param(keys::MEDIA)
    }

    pub fn language(&self) -> Option<&str> {
        self.param(keys::LANGUAGE)
    }

    pub fn query(&self) -> Option<&str> {
        self.param(keys::QUERY)
    }

    /// Serialize to a query string (no leading `?`). The mode comes first,
    /// remaining parameters in key order, so equal requests encode equally.
    pub fn encode(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(mode) = self.mode.as_str() {
            query.append_pair(keys::MODE, mode);
        }
        for (key, value) in &self.params {
            query.append_pair(key, value);
        }
        query.finish()
    }

    /// Parse a host-supplied query string. A leading `?` is tolerated, and
    /// the first value wins when the host delivers a key more than once.
    pub fn decode(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut mode: Option<String> = None;
        let mut params = BTreeMap::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key == keys::MODE {
                if mode.is_none() {
                    mode = Some(value.into_owned());
                }
            } else {
                params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
            }
        }
        Self {
            mode: Mode::parse(mode.as_deref()),
            params,
        }
    }

    /// Bind the encoded request to the plugin entrypoint, producing the
    /// opaque self-link the host replays.
    pub fn to_url(&self, entry: &str) -> String {
        format!("{}?{}", entry, self.encode())
    }
}
