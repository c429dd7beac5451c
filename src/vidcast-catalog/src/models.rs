//! Wire models for the catalog API.
//!
//! Everything optional on the wire stays optional here; emptiness checks
//! happen in the node factories, not during deserialization.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Tag vocabulary the catalog attaches to categories and media.
pub mod tags {
    /// Administratively hidden from set-top listings.
    pub const HIDDEN: &str = "SetTopBoxExclude";
    /// Category header offers a shuffled stream of its content.
    pub const STREAM_ENABLED: &str = "ChannelStreamEnabled";
    /// Subcategory media joins the parent category's shuffle queue.
    pub const SHUFFLE_IN_PARENT: &str = "AllowShuffleInParent";
    /// Search hits mark audio programs with a pseudo-tag.
    pub const AUDIO_HIT: &str = "type:audio";
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryResponse {
    pub category: Category,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaItemResponse {
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesResponse {
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: ImageSet,
    #[serde(default)]
    pub subcategories: Vec<Category>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

impl Category {
    pub fn is_hidden(&self) -> bool {
        self.tags.iter().any(|tag| tag == tags::HIDDEN)
    }

    pub fn is_streamable(&self) -> bool {
        self.tags
            .iter()
            .any(|tag| tag == tags::STREAM_ENABLED || tag == tags::SHUFFLE_IN_PARENT)
    }

    pub fn shuffles_into_parent(&self) -> bool {
        self.tags.iter().any(|tag| tag == tags::SHUFFLE_IN_PARENT)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(default)]
    pub natural_key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: ImageSet,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub first_published: Option<String>,
    #[serde(default)]
    pub available_languages: Vec<String>,
    #[serde(default)]
    pub files: Vec<MediaFile>,
}

impl MediaItem {
    pub fn is_hidden(&self) -> bool {
        self.tags.iter().any(|tag| tag == tags::HIDDEN)
    }

    pub fn is_audio(&self) -> bool {
        self.media_type.as_deref() == Some("audio")
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        self.duration.as_ref().and_then(Duration::as_seconds)
    }
}

/// Durations arrive either as a number of seconds or a clock string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Duration {
    Seconds(u32),
    Clock(String),
}

impl Duration {
    pub fn as_seconds(&self) -> Option<u32> {
        match self {
            Duration::Seconds(seconds) => Some(*seconds),
            Duration::Clock(clock) => parse_clock(clock),
        }
    }
}

/// Parse `HH:MM:SS`, `MM:SS` or plain seconds. `None` for anything else.
pub(crate) fn parse_clock(value: &str) -> Option<u32> {
    let parts: Vec<&str> = value.split(':').collect();
    let numbers: Vec<u32> = parts
        .iter()
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;
    match numbers.as_slice() {
        [hours, minutes, seconds] => Some(hours * 3600 + minutes * 60 + seconds),
        [minutes, seconds] => Some(minutes * 60 + seconds),
        [seconds] => Some(*seconds),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    /// Resolution label such as "720p".
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub frame_height: Option<u32>,
    pub download_url: String,
    #[serde(default)]
    pub filesize: Option<u64>,
    /// Subtitles burned into the video stream.
    #[serde(default)]
    pub subtitled: bool,
    #[serde(default)]
    pub subtitles: Option<SubtitleTrack>,
}

impl MediaFile {
    /// Height parsed from the label, falling back to `frameHeight`.
    pub fn resolution_height(&self) -> Option<u32> {
        self.label
            .as_deref()
            .and_then(|label| label.strip_suffix('p'))
            .and_then(|height| height.parse().ok())
            .or(self.frame_height)
    }

    /// Sidecar text track riding along with this file, if any.
    pub fn subtitle_url(&self) -> Option<&str> {
        self.subtitles.as_ref().and_then(|track| track.url.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubtitleTrack {
    #[serde(default)]
    pub url: Option<String>,
}

/// Artwork variants keyed by kind, then by size.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSet(pub BTreeMap<String, BTreeMap<String, String>>);

impl ImageSet {
    /// First URL matching the kind and size priority lists, in order.
    pub fn pick(&self, kinds: &[&str], sizes: &[&str]) -> Option<&str> {
        for kind in kinds {
            if let Some(by_size) = self.0.get(*kind) {
                for size in sizes {
                    if let Some(url) = by_size.get(*size) {
                        return Some(url);
                    }
                }
            }
        }
        None
    }

    pub fn icon(&self) -> Option<&str> {
        self.pick(&["square", "cover"], &["lg", "md"])
    }

    pub fn fanart(&self) -> Option<&str> {
        self.pick(&["wide", "landscape", "banner"], &["md", "lg"])
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vernacular: Option<String>,
}

impl Language {
    /// Catalog name plus native spelling, as shown in pickers.
    pub fn display_name(&self) -> String {
        match (self.name.as_deref(), self.vernacular.as_deref()) {
            (Some(name), Some(vernacular)) => format!("{} / {}", name, vernacular),
            (Some(name), None) => name.to_owned(),
            (None, Some(vernacular)) => vernacular.to_owned(),
            (None, None) => self.code.clone(),
        }
    }
}

/// Search results use a flat image list and a key/value metadata bag, a
/// different shape from the category endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub display_title: Option<String>,
    #[serde(default)]
    pub natural_key: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default)]
    pub images: Vec<HitImage>,
}

impl SearchHit {
    pub fn is_audio(&self) -> bool {
        self.tags.iter().any(|tag| tag == tags::AUDIO_HIT)
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        self.metadata
            .iter()
            .find(|entry| entry.key == "duration")
            .and_then(|entry| match &entry.value {
                serde_json::Value::Number(number) => {
                    number.as_u64().and_then(|n| u32::try_from(n).ok())
                }
                serde_json::Value::String(clock) => parse_clock(clock),
                _ => None,
            })
    }

    pub fn icon(&self) -> Option<&str> {
        self.image("square", "md")
    }

    pub fn fanart(&self) -> Option<&str> {
        self.image("landscape", "md")
    }

    fn image(&self, kind: &str, size: &str) -> Option<&str> {
        self.images
            .iter()
            .find(|image| image.kind == kind && image.size == size)
            .map(|image| image.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HitImage {
    #[serde(rename = "type")]
    pub kind: String,
    pub size: String,
    pub url: String,
}
