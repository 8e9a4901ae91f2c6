pub mod keys;
pub mod settings;
pub mod sources;

use crate::constants::{
    DEFAULT_ADMIN_PASSWORD, DEFAULT_APP_NAME, DEFAULT_ASSETS_PATH,
    DEFAULT_DARKTABLE_BIN, DEFAULT_DATABASE_DRIVER, DEFAULT_EXIFTOOL_BIN,
    DEFAULT_FFMPEG_BIN, DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT,
    DEFAULT_STORAGE_PATH, DEFAULT_THUMB_FILTER, DEFAULT_THUMB_QUALITY,
    DEFAULT_THUMB_SIZE, DEFAULT_WAKEUP_INTERVAL_SECS,
};

use serde::Serialize;
use std::path::PathBuf;

/// Identity of the embedding binary. Not configurable through options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub copyright: String,
}

impl AppInfo {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        copyright: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            copyright: copyright.into(),
        }
    }
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            copyright: String::new(),
        }
    }
}

/// Fully resolved option values. Every field has a default, so a value built
/// from no sources at all is usable.
///
/// Path overrides are `None` unless a source set them; the path resolver
/// derives the effective locations from `assets_path` and `storage_path`.
/// Intervals are kept in raw seconds because negative values carry meaning
/// (`auto_import = -1` disables the importer).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Options {
    pub debug: bool,
    pub read_only: bool,
    pub demo: bool,
    pub public: bool,
    pub experimental: bool,
    pub admin_password: String,

    pub workers: usize,
    pub wakeup_interval: i64,
    pub auto_index: i64,
    pub auto_import: i64,
    /// Megabytes; `<= 0` means unlimited.
    pub originals_limit: i64,

    pub http_host: String,
    pub http_port: u16,
    pub http_mode: String,

    pub site_url: String,
    pub site_preview: String,
    pub site_title: String,
    pub site_caption: String,
    pub site_description: String,
    pub site_author: String,

    pub disable_places: bool,
    pub disable_tensorflow: bool,
    pub detect_nsfw: bool,
    pub upload_nsfw: bool,
    pub detach_server: bool,

    pub database_driver: String,
    pub database_dsn: String,

    pub thumb_quality: u8,
    pub thumb_size: u32,
    pub thumb_filter: String,

    pub exiftool_bin: String,
    pub darktable_bin: String,
    pub ffmpeg_bin: String,

    pub assets_path: PathBuf,
    pub storage_path: PathBuf,
    pub originals_path: Option<PathBuf>,
    pub import_path: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    pub backup_path: Option<PathBuf>,
    pub temp_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub templates_path: Option<PathBuf>,
    pub static_path: Option<PathBuf>,
    pub build_path: Option<PathBuf>,
    pub img_path: Option<PathBuf>,
    pub pid_filename: Option<PathBuf>,
    pub log_filename: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debug: false,
            read_only: false,
            demo: false,
            public: false,
            experimental: false,
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),

            workers: 0,
            wakeup_interval: DEFAULT_WAKEUP_INTERVAL_SECS,
            auto_index: 0,
            auto_import: 0,
            originals_limit: -1,

            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            http_mode: String::new(),

            site_url: String::new(),
            site_preview: String::new(),
            site_title: String::new(),
            site_caption: String::new(),
            site_description: String::new(),
            site_author: String::new(),

            disable_places: false,
            disable_tensorflow: false,
            detect_nsfw: true,
            upload_nsfw: false,
            detach_server: false,

            database_driver: DEFAULT_DATABASE_DRIVER.to_string(),
            database_dsn: String::new(),

            thumb_quality: DEFAULT_THUMB_QUALITY,
            thumb_size: DEFAULT_THUMB_SIZE,
            thumb_filter: DEFAULT_THUMB_FILTER.to_string(),

            exiftool_bin: DEFAULT_EXIFTOOL_BIN.to_string(),
            darktable_bin: DEFAULT_DARKTABLE_BIN.to_string(),
            ffmpeg_bin: DEFAULT_FFMPEG_BIN.to_string(),

            assets_path: PathBuf::from(DEFAULT_ASSETS_PATH),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            originals_path: None,
            import_path: None,
            cache_path: None,
            backup_path: None,
            temp_path: None,
            config_path: None,
            config_file: None,
            templates_path: None,
            static_path: None,
            build_path: None,
            img_path: None,
            pid_filename: None,
            log_filename: None,
        }
    }
}

impl Options {
    /// Options rendered for display with secrets replaced.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.admin_password.is_empty() {
            copy.admin_password = "********".to_string();
        }
        if !copy.database_dsn.is_empty() {
            copy.database_dsn = "********".to_string();
        }
        copy
    }
}
