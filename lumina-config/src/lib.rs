//! Configuration core for the Lumina photo server.
//!
//! Options are merged from compiled-in defaults, an options file, `LUMINA_*`
//! environment variables and command-line flags, in that order of
//! precedence. The resolved [`Config`] derives every filesystem location
//! from the assets and storage roots, guards the runtime flags that may
//! change while the server runs, and produces the [`ClientConfig`] handed to
//! the web frontend.

pub mod checksum;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod loader;
pub mod models;
pub mod paths;
pub mod storage;
pub mod thumbs;
pub mod util;

pub use cli::{FlagContext, StaticFlags};
pub use client::ClientConfig;
pub use config::Config;
pub use loader::{
    EnvSource, LoadMetadata, OptionsLoad, OptionsLoader,
    error::{ConfigError, PathError},
};
pub use models::{
    AppInfo, Options,
    settings::{FeatureSettings, Settings},
};
pub use paths::PathResolver;
pub use storage::{StorageError, StorageHandle};
