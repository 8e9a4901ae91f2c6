use serde::{Deserialize, Deserializer, de};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use super::Options;
use crate::{
    cli::FlagContext,
    loader::error::ConfigError,
    util::{env_var_name, non_empty, parse_bool, parse_seconds},
};

/// Serialization format of an options file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Toml,
    Json,
}

impl FileFormat {
    /// Anything that is not TOML or JSON is read as YAML, which is what the
    /// default `options.yml` uses.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") | Some("tml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }
}

/// One source's view of the options: only the keys that source actually
/// set. Layers are merged by precedence and then completed with defaults.
///
/// Empty strings count as "not set" in every source, so an empty
/// `cache-path:` in the options file does not shadow the derived default.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OptionsLayer {
    pub debug: Option<bool>,
    pub read_only: Option<bool>,
    pub demo: Option<bool>,
    pub public: Option<bool>,
    pub experimental: Option<bool>,
    pub admin_password: Option<String>,

    pub workers: Option<usize>,
    #[serde(deserialize_with = "de_seconds")]
    pub wakeup_interval: Option<i64>,
    #[serde(deserialize_with = "de_seconds")]
    pub auto_index: Option<i64>,
    #[serde(deserialize_with = "de_seconds")]
    pub auto_import: Option<i64>,
    pub originals_limit: Option<i64>,

    pub http_host: Option<String>,
    pub http_port: Option<u16>,
    pub http_mode: Option<String>,

    pub site_url: Option<String>,
    pub site_preview: Option<String>,
    pub site_title: Option<String>,
    pub site_caption: Option<String>,
    pub site_description: Option<String>,
    pub site_author: Option<String>,

    pub disable_places: Option<bool>,
    pub disable_tensorflow: Option<bool>,
    pub detect_nsfw: Option<bool>,
    pub upload_nsfw: Option<bool>,
    pub detach_server: Option<bool>,

    pub database_driver: Option<String>,
    pub database_dsn: Option<String>,

    pub thumb_quality: Option<u8>,
    pub thumb_size: Option<u32>,
    pub thumb_filter: Option<String>,

    pub exiftool_bin: Option<String>,
    pub darktable_bin: Option<String>,
    pub ffmpeg_bin: Option<String>,

    pub assets_path: Option<PathBuf>,
    pub storage_path: Option<PathBuf>,
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

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeconds {
    Int(i64),
    Text(String),
}

fn de_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawSeconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawSeconds::Int(secs)) => Ok(Some(secs)),
        Some(RawSeconds::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(RawSeconds::Text(raw)) => parse_seconds(&raw)
            .map(Some)
            .ok_or_else(|| {
                de::Error::custom(format!("invalid interval '{raw}'"))
            }),
    }
}

/// Typed reads over a string lookup (environment or CLI flags).
struct Lookup<F> {
    get: F,
}

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn text(&self, key: &str) -> Option<String> {
        (self.get)(key).and_then(|raw| non_empty(&raw).map(str::to_string))
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.text(key).map(PathBuf::from)
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.text(key) {
            None => Ok(None),
            Some(raw) => parse_bool(&raw)
                .map(Some)
                .ok_or_else(|| ConfigError::invalid(key, raw, "a boolean")),
        }
    }

    fn number<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.text(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| ConfigError::invalid(key, raw, "a number")),
        }
    }

    fn seconds(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        match self.text(key) {
            None => Ok(None),
            Some(raw) => parse_seconds(&raw)
                .map(Some)
                .ok_or_else(|| ConfigError::invalid(key, raw, "an interval")),
        }
    }
}

impl OptionsLayer {
    /// Build a layer from any key lookup. The lookup receives kebab-case
    /// option names.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let l = Lookup { get };

        Ok(Self {
            debug: l.flag("debug")?,
            read_only: l.flag("read-only")?,
            demo: l.flag("demo")?,
            public: l.flag("public")?,
            experimental: l.flag("experimental")?,
            admin_password: l.text("admin-password"),

            workers: l.number("workers")?,
            wakeup_interval: l.seconds("wakeup-interval")?,
            auto_index: l.seconds("auto-index")?,
            auto_import: l.seconds("auto-import")?,
            originals_limit: l.number("originals-limit")?,

            http_host: l.text("http-host"),
            http_port: l.number("http-port")?,
            http_mode: l.text("http-mode"),

            site_url: l.text("site-url"),
            site_preview: l.text("site-preview"),
            site_title: l.text("site-title"),
            site_caption: l.text("site-caption"),
            site_description: l.text("site-description"),
            site_author: l.text("site-author"),

            disable_places: l.flag("disable-places")?,
            disable_tensorflow: l.flag("disable-tensorflow")?,
            detect_nsfw: l.flag("detect-nsfw")?,
            upload_nsfw: l.flag("upload-nsfw")?,
            detach_server: l.flag("detach-server")?,

            database_driver: l.text("database-driver"),
            database_dsn: l.text("database-dsn"),

            thumb_quality: l.number("thumb-quality")?,
            thumb_size: l.number("thumb-size")?,
            thumb_filter: l.text("thumb-filter"),

            exiftool_bin: l.text("exiftool-bin"),
            darktable_bin: l.text("darktable-bin"),
            ffmpeg_bin: l.text("ffmpeg-bin"),

            assets_path: l.path("assets-path"),
            storage_path: l.path("storage-path"),
            originals_path: l.path("originals-path"),
            import_path: l.path("import-path"),
            cache_path: l.path("cache-path"),
            backup_path: l.path("backup-path"),
            temp_path: l.path("temp-path"),
            config_path: l.path("config-path"),
            config_file: l.path("config-file"),
            templates_path: l.path("templates-path"),
            static_path: l.path("static-path"),
            build_path: l.path("build-path"),
            img_path: l.path("img-path"),
            pid_filename: l.path("pid-filename"),
            log_filename: l.path("log-filename"),
        })
    }

    /// Layer made of the flags that were explicitly given on the command
    /// line. Flags that only carry their declared default are ignored.
    pub fn from_flags(ctx: &dyn FlagContext) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            if ctx.is_set(key) {
                ctx.value(key)
            } else {
                None
            }
        })
    }

    /// Layer made of `LUMINA_*` variables, read through `env` so callers can
    /// pass a snapshot instead of the live process environment.
    pub fn from_env<E>(env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| env(&env_var_name(key)))
    }

    /// Parse an options file. The caller decides whether a missing file is
    /// an error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "parsing options file");
        Self::parse_str(&contents, FileFormat::from_path(path)).map_err(
            |message| ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
        )
    }

    pub fn parse_str(
        contents: &str,
        format: FileFormat,
    ) -> Result<Self, String> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let layer: Self = match format {
            FileFormat::Yaml => {
                serde_yaml::from_str(contents).map_err(|err| err.to_string())?
            }
            FileFormat::Toml => {
                toml::from_str(contents).map_err(|err| err.to_string())?
            }
            FileFormat::Json => {
                serde_json::from_str(contents).map_err(|err| err.to_string())?
            }
        };

        Ok(layer.without_empty_values())
    }

    /// Overwrite every key `other` sets. Merge lower-precedence layers
    /// first.
    pub fn merge_from(&mut self, other: OptionsLayer) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            };
        }

        take!(
            debug,
            read_only,
            demo,
            public,
            experimental,
            admin_password,
            workers,
            wakeup_interval,
            auto_index,
            auto_import,
            originals_limit,
            http_host,
            http_port,
            http_mode,
            site_url,
            site_preview,
            site_title,
            site_caption,
            site_description,
            site_author,
            disable_places,
            disable_tensorflow,
            detect_nsfw,
            upload_nsfw,
            detach_server,
            database_driver,
            database_dsn,
            thumb_quality,
            thumb_size,
            thumb_filter,
            exiftool_bin,
            darktable_bin,
            ffmpeg_bin,
            assets_path,
            storage_path,
            originals_path,
            import_path,
            cache_path,
            backup_path,
            temp_path,
            config_path,
            config_file,
            templates_path,
            static_path,
            build_path,
            img_path,
            pid_filename,
            log_filename,
        );
    }

    /// Complete the layer with compiled-in defaults.
    pub fn into_options(self) -> Options {
        let d = Options::default();

        Options {
            debug: self.debug.unwrap_or(d.debug),
            read_only: self.read_only.unwrap_or(d.read_only),
            demo: self.demo.unwrap_or(d.demo),
            public: self.public.unwrap_or(d.public),
            experimental: self.experimental.unwrap_or(d.experimental),
            admin_password: self.admin_password.unwrap_or(d.admin_password),

            workers: self.workers.unwrap_or(d.workers),
            wakeup_interval: self.wakeup_interval.unwrap_or(d.wakeup_interval),
            auto_index: self.auto_index.unwrap_or(d.auto_index),
            auto_import: self.auto_import.unwrap_or(d.auto_import),
            originals_limit: self.originals_limit.unwrap_or(d.originals_limit),

            http_host: self.http_host.unwrap_or(d.http_host),
            http_port: self.http_port.unwrap_or(d.http_port),
            http_mode: self.http_mode.unwrap_or(d.http_mode),

            site_url: self.site_url.unwrap_or(d.site_url),
            site_preview: self.site_preview.unwrap_or(d.site_preview),
            site_title: self.site_title.unwrap_or(d.site_title),
            site_caption: self.site_caption.unwrap_or(d.site_caption),
            site_description: self
                .site_description
                .unwrap_or(d.site_description),
            site_author: self.site_author.unwrap_or(d.site_author),

            disable_places: self.disable_places.unwrap_or(d.disable_places),
            disable_tensorflow: self
                .disable_tensorflow
                .unwrap_or(d.disable_tensorflow),
            detect_nsfw: self.detect_nsfw.unwrap_or(d.detect_nsfw),
            upload_nsfw: self.upload_nsfw.unwrap_or(d.upload_nsfw),
            detach_server: self.detach_server.unwrap_or(d.detach_server),

            database_driver: self.database_driver.unwrap_or(d.database_driver),
            database_dsn: self.database_dsn.unwrap_or(d.database_dsn),

            thumb_quality: self.thumb_quality.unwrap_or(d.thumb_quality),
            thumb_size: self.thumb_size.unwrap_or(d.thumb_size),
            thumb_filter: self.thumb_filter.unwrap_or(d.thumb_filter),

            exiftool_bin: self.exiftool_bin.unwrap_or(d.exiftool_bin),
            darktable_bin: self.darktable_bin.unwrap_or(d.darktable_bin),
            ffmpeg_bin: self.ffmpeg_bin.unwrap_or(d.ffmpeg_bin),

            assets_path: self.assets_path.unwrap_or(d.assets_path),
            storage_path: self.storage_path.unwrap_or(d.storage_path),
            originals_path: self.originals_path,
            import_path: self.import_path,
            cache_path: self.cache_path,
            backup_path: self.backup_path,
            temp_path: self.temp_path,
            config_path: self.config_path,
            config_file: self.config_file,
            templates_path: self.templates_path,
            static_path: self.static_path,
            build_path: self.build_path,
            img_path: self.img_path,
            pid_filename: self.pid_filename,
            log_filename: self.log_filename,
        }
    }

    fn without_empty_values(mut self) -> Self {
        fn text(value: &mut Option<String>) {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
        fn path(value: &mut Option<PathBuf>) {
            if value.as_ref().is_some_and(|v| v.as_os_str().is_empty()) {
                *value = None;
            }
        }

        for value in [
            &mut self.admin_password,
            &mut self.http_host,
            &mut self.http_mode,
            &mut self.site_url,
            &mut self.site_preview,
            &mut self.site_title,
            &mut self.site_caption,
            &mut self.site_description,
            &mut self.site_author,
            &mut self.database_driver,
            &mut self.database_dsn,
            &mut self.thumb_filter,
            &mut self.exiftool_bin,
            &mut self.darktable_bin,
            &mut self.ffmpeg_bin,
        ] {
            text(value);
        }

        for value in [
            &mut self.assets_path,
            &mut self.storage_path,
            &mut self.originals_path,
            &mut self.import_path,
            &mut self.cache_path,
            &mut self.backup_path,
            &mut self.temp_path,
            &mut self.config_path,
            &mut self.config_file,
            &mut self.templates_path,
            &mut self.static_path,
            &mut self.build_path,
            &mut self.img_path,
            &mut self.pid_filename,
            &mut self.log_filename,
        ] {
            path(value);
        }

        self
    }
}
