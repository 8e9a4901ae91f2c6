//! Compiled-in defaults and fixed names shared by the loader, the path
//! resolver and the settings facade.

use std::time::Duration;

/// Prefix for every environment variable read by the loader.
pub const ENV_PREFIX: &str = "LUMINA_";

pub const DEFAULT_APP_NAME: &str = "lumina";
pub const DEFAULT_ADMIN_PASSWORD: &str = "lumina";

pub const DEFAULT_ASSETS_PATH: &str = "assets";
pub const DEFAULT_STORAGE_PATH: &str = "storage";

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 2342;
pub const HTTP_MODE_RELEASE: &str = "release";
pub const HTTP_MODE_DEBUG: &str = "debug";

pub const DEFAULT_DATABASE_DRIVER: &str = "sqlite";
pub const SQLITE_FILENAME: &str = "index.db";

pub const DEFAULT_EXIFTOOL_BIN: &str = "exiftool";
pub const DEFAULT_DARKTABLE_BIN: &str = "darktable-cli";
pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";

pub const DEFAULT_THUMB_QUALITY: u8 = 90;
pub const MIN_THUMB_QUALITY: u8 = 25;
pub const MAX_THUMB_QUALITY: u8 = 100;
pub const DEFAULT_THUMB_SIZE: u32 = 2048;
pub const MIN_THUMB_SIZE: u32 = 720;
pub const MAX_THUMB_SIZE: u32 = 7680;
pub const DEFAULT_THUMB_FILTER: &str = "lanczos";

/// Default worker wakeup interval in seconds (15 minutes).
pub const DEFAULT_WAKEUP_INTERVAL_SECS: i64 = 900;
pub const MAX_WAKEUP_INTERVAL: Duration = Duration::from_secs(86_400);
/// Safety delay used when `auto-import` is zero or out of range.
pub const DEFAULT_AUTO_IMPORT_DELAY: Duration = Duration::from_secs(7_200);
pub const MAX_AUTO_IMPORT_SECS: i64 = 604_800;

pub const TENSORFLOW_VERSION: &str = "1.15.0";
pub const GEO_API_PLACES: &str = "places";

pub const OPTIONS_FILENAME: &str = "options.yml";
pub const SETTINGS_FILENAME: &str = "settings.yml";
pub const PID_FILENAME: &str = "lumina.pid";
pub const LOG_FILENAME: &str = "lumina.log";
pub const JS_BUNDLE: &str = "app.js";
pub const CSS_BUNDLE: &str = "app.css";

/// Preview image served when `site-preview` is unset, relative to the site
/// URL.
pub const DEFAULT_SITE_PREVIEW: &str = "static/img/preview.jpg";

/// Length of the hex digests handed to clients.
pub const CLIENT_HASH_LEN: usize = 16;
