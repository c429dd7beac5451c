pub mod config;
pub mod logging;
pub mod models;
pub mod paths;
pub mod request;
pub mod settings;

pub use config::{
    CatalogConfig, Config, ConfigError, LogLevel, LoggingConfig, PluginConfig, ValidationError,
};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use models::{
    ActionNode, CategoryKey, CategoryNode, LanguageCode, MediaKey, MediaKind, MediaNode,
    NavigationNode, PlaceholderNode, PlayTarget, ResolvedMedia, ResolvedStream, StreamUrl,
};
pub use paths::{AppDirs, DirsError};
pub use request::{Mode, Request};
pub use settings::{MemorySettings, RankingPreferences, Settings, SettingsStore};

pub const APP_NAME: &str = "vidcast";
pub const APP_AUTHOR: &str = "Vidcast";
pub const APP_QUALIFIER: &str = "tv";

/// Catalog language carrying the undubbed reference audio track.
pub const REFERENCE_LANGUAGE: &str = "en";
