//! The table of recognized option keys. Flag names, options-file keys and
//! environment variables are all derived from these names.

/// Value shape of an option, used to build CLI flags and sample values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Text,
    Path,
    Int,
    Bool,
    /// Seconds, or a `humantime` string such as `15m`.
    Seconds,
}

#[derive(Debug, Clone, Copy)]
pub struct OptionKey {
    pub name: &'static str,
    pub kind: OptionKind,
    pub help: &'static str,
    /// Secrets are redacted when options are printed.
    pub secret: bool,
}

const fn key(
    name: &'static str,
    kind: OptionKind,
    help: &'static str,
) -> OptionKey {
    OptionKey {
        name,
        kind,
        help,
        secret: false,
    }
}

const fn secret(
    name: &'static str,
    kind: OptionKind,
    help: &'static str,
) -> OptionKey {
    OptionKey {
        name,
        kind,
        help,
        secret: true,
    }
}

use OptionKind::{Bool, Int, Path, Seconds, Text};

pub const OPTION_KEYS: &[OptionKey] = &[
    key("debug", Bool, "run in debug mode"),
    key("read-only", Bool, "disable import, upload and delete"),
    key("demo", Bool, "enable demo mode"),
    key("public", Bool, "disable password authentication"),
    key("experimental", Bool, "enable experimental features"),
    secret("admin-password", Text, "initial admin password"),
    key("workers", Int, "number of indexing workers (0 = auto)"),
    key("wakeup-interval", Seconds, "background worker wakeup interval"),
    key("auto-index", Seconds, "indexing delay after uploads, 0 to disable"),
    key("auto-import", Seconds, "auto import safety delay, -1 to disable"),
    key("originals-limit", Int, "originals size limit in MB, -1 for none"),
    key("http-host", Text, "web server bind address"),
    key("http-port", Int, "web server port"),
    key("http-mode", Text, "web server mode (debug, release, test)"),
    key("site-url", Text, "public site URL"),
    key("site-preview", Text, "site preview image URL"),
    key("site-title", Text, "site title"),
    key("site-caption", Text, "site caption"),
    key("site-description", Text, "site description"),
    key("site-author", Text, "site owner or copyright holder"),
    key("disable-places", Bool, "disable reverse geocoding"),
    key("disable-tensorflow", Bool, "disable image classification"),
    key("detect-nsfw", Bool, "flag photos that may be offensive"),
    key("upload-nsfw", Bool, "allow uploads that may be offensive"),
    key("detach-server", Bool, "detach from the console (daemon mode)"),
    key("database-driver", Text, "database driver (sqlite or mysql)"),
    secret("database-dsn", Text, "database data source name"),
    key("thumb-quality", Int, "JPEG quality of thumbnails (25-100)"),
    key("thumb-size", Int, "maximum pre-rendered thumbnail size in pixels"),
    key("thumb-filter", Text, "thumbnail resample filter"),
    key("exiftool-bin", Text, "ExifTool binary"),
    key("darktable-bin", Text, "Darktable CLI binary"),
    key("ffmpeg-bin", Text, "FFmpeg binary"),
    key("assets-path", Path, "assets root (templates, static files, models)"),
    key("storage-path", Path, "storage root (cache, config, database)"),
    key("originals-path", Path, "originals library path"),
    key("import-path", Path, "import path"),
    key("cache-path", Path, "cache path"),
    key("backup-path", Path, "backup path"),
    key("temp-path", Path, "temporary files path"),
    key("config-path", Path, "config path"),
    key("config-file", Path, "options file"),
    key("templates-path", Path, "HTML templates path"),
    key("static-path", Path, "static assets path"),
    key("build-path", Path, "compiled frontend bundles path"),
    key("img-path", Path, "static images path"),
    key("pid-filename", Path, "daemon PID file"),
    key("log-filename", Path, "daemon log file"),
];

/// Look up a key by name.
pub fn find(name: &str) -> Option<&'static OptionKey> {
    OPTION_KEYS.iter().find(|key| key.name == name)
}
