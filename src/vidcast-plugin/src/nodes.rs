//! Factories turning catalog payloads into navigation nodes.
//!
//! Each source shape (category JSON, media JSON, search-hit JSON) has its
//! own factory, and every factory returns a [`NodeOutcome`] so callers can
//! tell "nothing to show" apart from a node without sentinel values.

use crate::ranker::select_best_file;
use std::fmt;
use vidcast_catalog::models::{Category, MediaItem, SearchHit};
use vidcast_core::{
    ActionNode, CategoryKey, CategoryNode, LanguageCode, MediaKey, MediaKind, MediaNode,
    NavigationNode, PlaceholderNode, PlayTarget, RankingPreferences, Request, ResolvedMedia,
    ResolvedStream, StreamUrl,
};

/// Title of the gated placeholder standing in for hidden media.
pub const GATED_TITLE: &str = "Hidden media";

/// Title of the synthetic search entry on the top-level page.
pub const SEARCH_TITLE: &str = "Search";

/// Suffix appended to audio-only search hits.
const AUDIO_SUFFIX: &str = " (audio)";

/// Why a source entry produced no node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Administratively hidden; dropped silently.
    Hidden,
    /// No key to address the entry by.
    MissingKey,
    /// The ranker found no usable file.
    NotPlayable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Hidden => write!(f, "entry is hidden"),
            SkipReason::MissingKey => write!(f, "entry has no key metadata"),
            SkipReason::NotPlayable => write!(f, "media has no playable files"),
        }
    }
}

/// A factory verdict: a node to emit, or a reason there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    Emit(NavigationNode),
    Skip(SkipReason),
}

impl NodeOutcome {
    /// The node, logging unexpected skips. Hidden entries drop silently;
    /// they are routine.
    pub fn node(self) -> Option<NavigationNode> {
        match self {
            NodeOutcome::Emit(node) => Some(node),
            NodeOutcome::Skip(SkipReason::Hidden) => None,
            NodeOutcome::Skip(reason) => {
                tracing::warn!("{reason}, skipping");
                None
            }
        }
    }
}

/// Build a folder node from a category payload.
pub fn category_node(category: &Category) -> NodeOutcome {
    if category.is_hidden() {
        return NodeOutcome::Skip(SkipReason::Hidden);
    }
    let Some(key) = category.key.as_deref() else {
        return NodeOutcome::Skip(SkipReason::MissingKey);
    };
    let key = CategoryKey::new(key);
    NodeOutcome::Emit(NavigationNode::Category(CategoryNode {
        open: Request::browse(&key),
        title: category.name.clone().unwrap_or_default(),
        icon: category.images.icon().map(str::to_owned),
        fanart: category.images.fanart().map(str::to_owned),
        description: category.description.clone(),
        streamable: category.is_streamable(),
        key: Some(key),
    }))
}

/// Build a playable node from a media payload.
///
/// With `censor_hidden` set, hidden items become gated placeholders routed
/// through `ask_hidden` instead of playable nodes. Without it the item is
/// built as-is; callers that must not show hidden media filter beforehand.
pub fn media_node(
    item: &MediaItem,
    prefs: &RankingPreferences,
    censor_hidden: bool,
) -> NodeOutcome {
    let key = item.natural_key.as_deref().map(MediaKey::from);

    if item.is_hidden() && censor_hidden {
        return match key {
            Some(key) => NodeOutcome::Emit(NavigationNode::Gated(PlaceholderNode {
                unlock: Request::ask_hidden(&key),
                title: GATED_TITLE.to_owned(),
                key,
            })),
            None => NodeOutcome::Skip(SkipReason::MissingKey),
        };
    }

    let Some(file) = select_best_file(&item.files, prefs) else {
        return NodeOutcome::Skip(SkipReason::NotPlayable);
    };

    NodeOutcome::Emit(NavigationNode::Media(MediaNode {
        key,
        title: item.title.clone().unwrap_or_default(),
        icon: item.images.icon().map(str::to_owned),
        fanart: item.images.fanart().map(str::to_owned),
        description: item.description.clone(),
        kind: kind_of(item),
        duration_seconds: item.duration_seconds(),
        published: item.first_published.clone(),
        languages: item
            .available_languages
            .iter()
            .map(|code| LanguageCode::from(code.as_str()))
            .collect(),
        target: PlayTarget::Direct(ResolvedStream {
            url: StreamUrl::new(file.download_url.clone()),
            size_bytes: file.filesize,
            subtitles: file.subtitle_url().map(str::to_owned),
        }),
    }))
}

/// Build a playable node from a search hit. Hits carry no file list, so the
/// target is a deferred `play` self-request.
pub fn search_hit_node(hit: &SearchHit) -> NodeOutcome {
    let Some(key) = hit.natural_key.as_deref() else {
        return NodeOutcome::Skip(SkipReason::MissingKey);
    };
    let key = MediaKey::from(key);
    let mut title = hit.display_title.clone().unwrap_or_default();
    let kind = if hit.is_audio() {
        title.push_str(AUDIO_SUFFIX);
        MediaKind::Audio
    } else {
        MediaKind::Video
    };
    NodeOutcome::Emit(NavigationNode::Media(MediaNode {
        target: PlayTarget::Deferred(Request::play(&key, None)),
        key: Some(key),
        title,
        icon: hit.icon().map(str::to_owned),
        fanart: hit.fanart().map(str::to_owned),
        description: None,
        kind,
        duration_seconds: hit.duration_seconds(),
        published: None,
        languages: Vec::new(),
    }))
}

/// The synthetic search entry appended to the top-level listing.
pub fn search_entry() -> NavigationNode {
    NavigationNode::Action(ActionNode {
        title: SEARCH_TITLE.to_owned(),
        icon: None,
        request: Request::search(),
    })
}

/// Rank a media item's files into a playable result. `requested_key` backs
/// up the item's own key so `play` can answer for exactly what was asked.
pub fn resolved_media(
    item: &MediaItem,
    prefs: &RankingPreferences,
    requested_key: Option<&str>,
) -> Option<ResolvedMedia> {
    let key = item
        .natural_key
        .as_deref()
        .or(requested_key)
        .map(MediaKey::from)?;
    let file = select_best_file(&item.files, prefs)?;
    Some(ResolvedMedia {
        key,
        title: item.title.clone().unwrap_or_default(),
        url: StreamUrl::new(file.download_url.clone()),
        subtitles: file.subtitle_url().map(str::to_owned),
        kind: kind_of(item),
        duration_seconds: item.duration_seconds(),
    })
}

fn kind_of(item: &MediaItem) -> MediaKind {
    if item.is_audio() {
        MediaKind::Audio
    } else {
        MediaKind::Video
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidcast_catalog::models::tags;

    fn prefs() -> RankingPreferences {
        RankingPreferences {
            max_height: 1080,
            prefer_hard_subtitles: false,
        }
    }

    fn media_json(value: serde_json::Value) -> MediaItem {
        serde_json::from_value(value).expect("media should parse")
    }

    #[test]
    fn hidden_category_is_skipped() {
        let category: Category = serde_json::from_value(serde_json::json!({
            "key": "VODHidden",
            "name": "Hidden",
            "tags": [tags::HIDDEN],
        }))
        .expect("category should parse");
        assert_eq!(category_node(&category), NodeOutcome::Skip(SkipReason::Hidden));
    }

    #[test]
    fn keyless_category_is_skipped() {
        let category: Category =
            serde_json::from_value(serde_json::json!({"name": "No key"})).expect("should parse");
        assert_eq!(
            category_node(&category),
            NodeOutcome::Skip(SkipReason::MissingKey)
        );
    }

    #[test]
    fn streamable_tag_marks_the_node() {
        let category: Category = serde_json::from_value(serde_json::json!({
            "key": "Music",
            "name": "Music",
            "tags": [tags::STREAM_ENABLED],
        }))
        .expect("category should parse");
        match category_node(&category) {
            NodeOutcome::Emit(NavigationNode::Category(node)) => {
                assert!(node.streamable);
                assert_eq!(node.open, Request::browse(&CategoryKey::new("Music")));
            }
            other => panic!("expected category node, got {other:?}"),
        }
    }

    #[test]
    fn hidden_media_becomes_gated_placeholder() {
        let item = media_json(serde_json::json!({
            "naturalKey": "pub-secret",
            "title": "Secret",
            "tags": [tags::HIDDEN],
            "files": [{"label": "360p", "downloadUrl": "https://cdn.example/secret.mp4"}],
        }));
        match media_node(&item, &prefs(), true) {
            NodeOutcome::Emit(NavigationNode::Gated(node)) => {
                assert_eq!(node.unlock, Request::ask_hidden(&MediaKey::new("pub-secret")));
            }
            other => panic!("expected gated placeholder, got {other:?}"),
        }
    }

    #[test]
    fn hidden_media_without_key_is_skipped() {
        let item = media_json(serde_json::json!({
            "title": "Secret",
            "tags": [tags::HIDDEN],
        }));
        assert_eq!(
            media_node(&item, &prefs(), true),
            NodeOutcome::Skip(SkipReason::MissingKey)
        );
    }

    #[test]
    fn uncensored_hidden_media_builds_normally() {
        let item = media_json(serde_json::json!({
            "naturalKey": "pub-secret",
            "title": "Secret",
            "tags": [tags::HIDDEN],
            "files": [{"label": "360p", "downloadUrl": "https://cdn.example/secret.mp4"}],
        }));
        match media_node(&item, &prefs(), false) {
            NodeOutcome::Emit(NavigationNode::Media(node)) => {
                assert_eq!(node.title, "Secret");
            }
            other => panic!("expected media node, got {other:?}"),
        }
    }

    #[test]
    fn media_without_files_is_not_playable() {
        let item = media_json(serde_json::json!({
            "naturalKey": "pub-empty",
            "title": "Empty",
        }));
        assert_eq!(
            media_node(&item, &prefs(), true),
            NodeOutcome::Skip(SkipReason::NotPlayable)
        );
    }

    #[test]
    fn media_node_carries_sidecar_subtitles() {
        let item = media_json(serde_json::json!({
            "naturalKey": "pub-x",
            "title": "With subs",
            "files": [{
                "label": "720p",
                "downloadUrl": "https://cdn.example/x.mp4",
                "filesize": 1234,
                "subtitles": {"url": "https://cdn.example/x.vtt"},
            }],
        }));
        match media_node(&item, &prefs(), true) {
            NodeOutcome::Emit(NavigationNode::Media(node)) => match node.target {
                PlayTarget::Direct(stream) => {
                    assert_eq!(stream.url.as_ref(), "https://cdn.example/x.mp4");
                    assert_eq!(stream.size_bytes, Some(1234));
                    assert_eq!(stream.subtitles.as_deref(), Some("https://cdn.example/x.vtt"));
                }
                other => panic!("expected direct target, got {other:?}"),
            },
            other => panic!("expected media node, got {other:?}"),
        }
    }

    #[test]
    fn search_hit_defers_to_play_request() {
        let hit: SearchHit = serde_json::from_value(serde_json::json!({
            "displayTitle": "A Talk",
            "naturalKey": "pub-talk",
            "tags": [tags::AUDIO_HIT],
        }))
        .expect("hit should parse");
        match search_hit_node(&hit) {
            NodeOutcome::Emit(NavigationNode::Media(node)) => {
                assert_eq!(node.kind, MediaKind::Audio);
                assert_eq!(node.title, "A Talk (audio)");
                assert_eq!(
                    node.target,
                    PlayTarget::Deferred(Request::play(&MediaKey::new("pub-talk"), None))
                );
            }
            other => panic!("expected media node, got {other:?}"),
        }
    }

    #[test]
    fn keyless_search_hit_is_skipped() {
        let hit: SearchHit =
            serde_json::from_value(serde_json::json!({"displayTitle": "Ghost"}))
                .expect("hit should parse");
        assert_eq!(search_hit_node(&hit), NodeOutcome::Skip(SkipReason::MissingKey));
    }

    #[test]
    fn resolved_media_uses_requested_key_as_fallback() {
        let item = media_json(serde_json::json!({
            "title": "Untagged",
            "files": [{"label": "480p", "downloadUrl": "https://cdn.example/u.mp4"}],
        }));
        let resolved =
            resolved_media(&item, &prefs(), Some("pub-requested")).expect("should resolve");
        assert_eq!(resolved.key, MediaKey::new("pub-requested"));
    }
}
