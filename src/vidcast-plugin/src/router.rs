//! Mode dispatch and the page handlers behind it.
//!
//! Each invocation is independent: the router matches the request mode,
//! runs exactly one handler, and terminates. Navigation fetches are hard
//! failures (no partial listings); per-item problems inside a listing or
//! queue are soft and only drop that item.

use crate::nodes::{
    category_node, media_node, resolved_media, search_entry, search_hit_node, NodeOutcome,
};
use crate::playback::{reveal_subtitles, PlaybackEngine, SUBTITLE_POLL_ATTEMPTS, SUBTITLE_POLL_INTERVAL};
use rand::seq::SliceRandom;
use rand::thread_rng;
use thiserror::Error;
use vidcast_catalog::models::MediaItem;
use vidcast_catalog::{CatalogClient, CatalogError};
use vidcast_core::request::{keys, LEGACY_STREAM_PREFIX};
use vidcast_core::{
    ActionNode, LanguageCode, MediaKey, Mode, NavigationNode, Request, ResolvedMedia, Settings,
    SettingsStore, REFERENCE_LANGUAGE,
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("catalog request failed: {0}")]
    Catalog(#[from] CatalogError),
    #[error("authentication failed after token refresh: {0}")]
    Auth(CatalogError),
    #[error("no playable file for {key}")]
    NotPlayable { key: String },
    #[error("missing required parameter \"{name}\"")]
    MissingParam { name: &'static str },
}

/// What one invocation hands back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Listing(Vec<NavigationNode>),
    Resolved(ResolvedMedia),
    /// Shuffled playback queue, already in play order.
    Queue(Vec<ResolvedMedia>),
    /// A settings mutation with nothing to display.
    Updated,
}

pub struct Router<'a, S: SettingsStore> {
    catalog: &'a CatalogClient,
    settings: Settings<'a, S>,
    playback: Option<&'a mut dyn PlaybackEngine>,
}

impl<'a, S: SettingsStore> Router<'a, S> {
    pub fn new(catalog: &'a CatalogClient, store: &'a mut S) -> Self {
        Self {
            catalog,
            settings: Settings::new(store),
            playback: None,
        }
    }

    /// Attach the host player so language-override playback can surface
    /// subtitle tracks once the stream is up.
    pub fn with_playback(mut self, engine: &'a mut dyn PlaybackEngine) -> Self {
        self.playback = Some(engine);
        self
    }

    pub async fn handle(&mut self, request: &Request) -> Result<Outcome, HandlerError> {
        match &request.mode {
            Mode::Root => self.root_page().await,
            Mode::Browse => {
                let key = require(request, keys::CATEGORY)?;
                self.browse(key).await
            }
            Mode::Play => {
                let key = require(request, keys::MEDIA)?;
                self.play(key, request.language(), false).await
            }
            Mode::PlayUndubbed => {
                let key = require(request, keys::MEDIA)?;
                self.play(key, request.language(), true).await
            }
            Mode::Languages => self.languages(request.media()).await,
            Mode::SetLanguage => {
                let code = require(request, keys::LANGUAGE)?;
                self.set_language(code)
            }
            Mode::Search => {
                let query = require(request, keys::QUERY)?;
                self.search(query).await
            }
            Mode::AskHidden => {
                let key = require(request, keys::MEDIA)?;
                self.ask_hidden(key).await
            }
            Mode::Stream => {
                let key = require(request, keys::CATEGORY)?;
                self.stream(key).await
            }
            // Unrecognized modes keep old persisted links alive: the
            // historical stream links used the bare mode string as the
            // category key, everything else browses by mode.
            Mode::Legacy(raw) => {
                if raw.starts_with(LEGACY_STREAM_PREFIX) && raw != LEGACY_STREAM_PREFIX {
                    self.stream(raw).await
                } else {
                    self.browse(raw).await
                }
            }
        }
    }

    async fn root_page(&mut self) -> Result<Outcome, HandlerError> {
        let lang = self.settings.language();
        let categories = self.catalog.category_list(&lang).await?;
        let mut items: Vec<NavigationNode> = categories
            .iter()
            .filter_map(|category| category_node(category).node())
            .collect();
        items.push(search_entry());
        Ok(Outcome::Listing(items))
    }

    async fn browse(&mut self, key: &str) -> Result<Outcome, HandlerError> {
        let lang = self.settings.language();
        let category = self.catalog.category(&lang, key).await?;
        let prefs = self.settings.ranking();

        let mut items: Vec<NavigationNode> = category
            .subcategories
            .iter()
            .filter_map(|sub| category_node(sub).node())
            .collect();
        items.extend(
            category
                .media
                .iter()
                .filter_map(|item| media_node(item, &prefs, true).node()),
        );
        Ok(Outcome::Listing(items))
    }

    async fn play(
        &mut self,
        key: &str,
        language: Option<&str>,
        undubbed: bool,
    ) -> Result<Outcome, HandlerError> {
        let active = self.settings.language();
        let override_lang = if undubbed {
            Some(LanguageCode::new(REFERENCE_LANGUAGE))
        } else if let Some(code) = language {
            let code = LanguageCode::from(code);
            self.settings.push_language_history(&code);
            Some(code)
        } else if let Some(code) = self.settings.take_playback_language() {
            self.settings.push_language_history(&code);
            Some(code)
        } else {
            None
        };

        let lang = override_lang.clone().unwrap_or_else(|| active.clone());
        let item = self.catalog.media_item(&lang, key).await?;
        let prefs = self.settings.ranking();
        let mut resolved =
            resolved_media(&item, &prefs, Some(key)).ok_or(HandlerError::NotPlayable {
                key: key.to_owned(),
            })?;

        if undubbed {
            // Keep the reference audio but show subtitles in the viewer's
            // language; losing them is not worth failing the playback.
            match self.catalog.media_item(&active, key).await {
                Ok(localized) => {
                    if let Some(subtitles) =
                        resolved_media(&localized, &prefs, Some(key)).and_then(|m| m.subtitles)
                    {
                        resolved.subtitles = Some(subtitles);
                    }
                }
                Err(e) => tracing::warn!("subtitle enrichment failed: {e}"),
            }
        }

        if override_lang.is_some() && resolved.subtitles.is_some() {
            if let Some(engine) = self.playback.as_deref_mut() {
                reveal_subtitles(engine, SUBTITLE_POLL_ATTEMPTS, SUBTITLE_POLL_INTERVAL).await;
            }
        }

        Ok(Outcome::Resolved(resolved))
    }

    async fn languages(&mut self, media: Option<&str>) -> Result<Outcome, HandlerError> {
        let active = self.settings.language();
        // The catalog delivers the list pre-sorted by name; that order is
        // preserved apart from floating recent picks to the front.
        let mut remaining = self.catalog.languages(&active).await?;

        let filter = match media {
            Some(key) => {
                let item = self.catalog.media_item(&active, key).await?;
                Some((MediaKey::from(key), item.available_languages))
            }
            None => None,
        };

        let mut ordered = Vec::with_capacity(remaining.len());
        for recent in self.settings.language_history() {
            if let Some(position) = remaining
                .iter()
                .position(|language| language.code == recent.as_ref())
            {
                ordered.push(remaining.remove(position));
            }
        }
        ordered.append(&mut remaining);

        if let Some((_, available)) = &filter {
            ordered.retain(|language| available.iter().any(|code| *code == language.code));
        }

        let items = ordered
            .into_iter()
            .map(|language| {
                let code = LanguageCode::new(language.code.clone());
                let request = match &filter {
                    Some((key, _)) => Request::play(key, Some(&code)),
                    None => Request::set_language(&code),
                };
                NavigationNode::Action(ActionNode {
                    title: language.display_name(),
                    icon: None,
                    request,
                })
            })
            .collect();
        Ok(Outcome::Listing(items))
    }

    fn set_language(&mut self, code: &str) -> Result<Outcome, HandlerError> {
        self.settings.set_language(&LanguageCode::from(code));
        Ok(Outcome::Updated)
    }

    async fn search(&mut self, query: &str) -> Result<Outcome, HandlerError> {
        let lang = self.settings.language();
        let token = match self.settings.auth_token() {
            Some(token) => token,
            None => self.refresh_token().await?,
        };

        let hits = match self.catalog.search(&lang, query, &token).await {
            Err(CatalogError::Auth { .. }) => {
                let token = self.refresh_token().await?;
                self.catalog
                    .search(&lang, query, &token)
                    .await
                    .map_err(|e| match e {
                        CatalogError::Auth { .. } => HandlerError::Auth(e),
                        other => HandlerError::Catalog(other),
                    })?
            }
            result => result?,
        };

        let items = hits
            .iter()
            .filter_map(|hit| search_hit_node(hit).node())
            .collect();
        Ok(Outcome::Listing(items))
    }

    async fn ask_hidden(&mut self, key: &str) -> Result<Outcome, HandlerError> {
        let lang = self.settings.language();
        let item = self.catalog.media_item(&lang, key).await?;
        let prefs = self.settings.ranking();
        match media_node(&item, &prefs, false) {
            NodeOutcome::Emit(node) => Ok(Outcome::Listing(vec![node])),
            NodeOutcome::Skip(_) => Err(HandlerError::NotPlayable {
                key: key.to_owned(),
            }),
        }
    }

    async fn stream(&mut self, key: &str) -> Result<Outcome, HandlerError> {
        let lang = self.settings.language();
        let category = self.catalog.category(&lang, key).await?;
        let prefs = self.settings.ranking();

        let mut pool: Vec<MediaItem> = category.media;
        for sub in category.subcategories {
            // Only explicitly opted-in subcategories join the queue;
            // highlight folders would duplicate their parent's media.
            if sub.shuffles_into_parent() {
                pool.extend(sub.media);
            }
        }
        pool.shuffle(&mut thread_rng());

        let queue = pool
            .iter()
            .filter(|item| !item.is_hidden())
            .filter_map(|item| match resolved_media(item, &prefs, None) {
                Some(resolved) => Some(resolved),
                None => {
                    tracing::warn!("dropping unplayable item from queue");
                    None
                }
            })
            .collect();
        Ok(Outcome::Queue(queue))
    }

    async fn refresh_token(&mut self) -> Result<String, HandlerError> {
        let token = self.catalog.fetch_token().await?;
        self.settings.set_auth_token(&token);
        Ok(token)
    }
}

fn require<'r>(request: &'r Request, name: &'static str) -> Result<&'r str, HandlerError> {
    request
        .param(name)
        .ok_or(HandlerError::MissingParam { name })
}
