//! The seam to the host's settings storage.
//!
//! Persistence across invocations happens only through this store; the
//! plugin itself keeps no state. Values are read once at invocation start
//! and passed around explicitly.

use crate::models::LanguageCode;
use std::collections::BTreeMap;

/// Setting keys shared with the host.
pub mod keys {
    pub const RESOLUTION: &str = "video_res";
    pub const HARD_SUBTITLES: &str = "hard_subtitles";
    pub const LANGUAGE: &str = "language";
    pub const LANGUAGE_HISTORY: &str = "lang_history";
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const PLAYBACK_LANGUAGE: &str = "playback_language";
}

/// Selectable resolution caps, indexed by the `video_res` setting.
pub const RESOLUTION_LADDER: [u32; 5] = [1080, 720, 480, 360, 240];

const HISTORY_LIMIT: usize = 5;

const DEFAULT_LANGUAGE: &str = "en";

/// Minimal key-value contract the host's settings storage fulfills. Writes
/// are serialized by the store, not by us.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }
}

/// User preferences consumed by the file ranker, immutable for the lifetime
/// of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPreferences {
    /// Highest acceptable resolution height; files above it only play when
    /// nothing at or under the cap exists.
    pub max_height: u32,
    /// Prefer streams with burned-in subtitles.
    pub prefer_hard_subtitles: bool,
}

/// Typed access to the well-known settings.
pub struct Settings<'a, S: SettingsStore> {
    store: &'a mut S,
}

impl<'a, S: SettingsStore> Settings<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    pub fn language(&self) -> LanguageCode {
        match self.store.get(keys::LANGUAGE) {
            Some(code) if !code.is_empty() => LanguageCode::new(code),
            _ => LanguageCode::new(DEFAULT_LANGUAGE),
        }
    }

    /// Persist the active language and float it in the recency history.
    pub fn set_language(&mut self, code: &LanguageCode) {
        self.store.set(keys::LANGUAGE, code.as_ref());
        self.push_language_history(code);
    }

    /// Most-recent-first language codes, at most five.
    pub fn language_history(&self) -> Vec<LanguageCode> {
        self.store
            .get(keys::LANGUAGE_HISTORY)
            .unwrap_or_default()
            .split_whitespace()
            .map(LanguageCode::from)
            .collect()
    }

    /// Move `code` to the front of the history, dropping the oldest entry
    /// once the list is full. Pushing a known code never duplicates it.
    pub fn push_language_history(&mut self, code: &LanguageCode) {
        let mut history = self.language_history();
        history.retain(|entry| entry != code);
        history.insert(0, code.clone());
        history.truncate(HISTORY_LIMIT);
        let joined = history
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        self.store.set(keys::LANGUAGE_HISTORY, &joined);
    }

    pub fn ranking(&self) -> RankingPreferences {
        let index = self
            .store
            .get(keys::RESOLUTION)
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(0);
        let max_height = RESOLUTION_LADDER
            .get(index)
            .copied()
            .unwrap_or(RESOLUTION_LADDER[0]);
        let prefer_hard_subtitles = self
            .store
            .get(keys::HARD_SUBTITLES)
            .is_some_and(|value| value == "true");
        RankingPreferences {
            max_height,
            prefer_hard_subtitles,
        }
    }

    pub fn auth_token(&self) -> Option<String> {
        self.store.get(keys::AUTH_TOKEN).filter(|token| !token.is_empty())
    }

    pub fn set_auth_token(&mut self, token: &str) {
        self.store.set(keys::AUTH_TOKEN, token);
    }

    pub fn set_playback_language(&mut self, code: &LanguageCode) {
        self.store.set(keys::PLAYBACK_LANGUAGE, code.as_ref());
    }

    /// Consume the one-shot language override left for the next playback.
    pub fn take_playback_language(&mut self) -> Option<LanguageCode> {
        let code = self
            .store
            .get(keys::PLAYBACK_LANGUAGE)
            .filter(|code| !code.is_empty())?;
        self.store.set(keys::PLAYBACK_LANGUAGE, "");
        Some(LanguageCode::new(code))
    }
}
