//! The shared configuration object.
//!
//! A [`Config`] is built once at startup, wrapped in an `Arc` and handed to
//! every component that needs settings. Accessors never fail: they return a
//! resolved value or a documented fallback.

use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    checksum::short_hash,
    cli::FlagContext,
    constants::{
        DEFAULT_AUTO_IMPORT_DELAY, DEFAULT_SITE_PREVIEW,
        DEFAULT_WAKEUP_INTERVAL_SECS, GEO_API_PLACES, HTTP_MODE_DEBUG,
        HTTP_MODE_RELEASE, MAX_AUTO_IMPORT_SECS, MAX_THUMB_QUALITY,
        MAX_THUMB_SIZE, MAX_WAKEUP_INTERVAL, MIN_THUMB_QUALITY,
        MIN_THUMB_SIZE, TENSORFLOW_VERSION,
    },
    loader::{
        OptionsLoader,
        error::{ConfigError, PathError},
    },
    models::{AppInfo, Options, settings::Settings},
    paths::PathResolver,
    storage::{StorageError, StorageHandle},
    thumbs::{self, ThumbType},
};

const MACHINE_ID_FILE: &str = "/etc/machine-id";

enum StorageSlot {
    Empty,
    Open(Arc<dyn StorageHandle>),
    Closed,
}

pub struct Config {
    app: AppInfo,
    options: RwLock<Options>,
    settings: RwLock<Settings>,
    storage: Mutex<StorageSlot>,
    serial: OnceCell<String>,
    serial_checksum: OnceCell<String>,
    cpus: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app", &self.app)
            .field("options", &self.options.read().redacted())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Build a configuration from already resolved options. Relative roots
    /// are anchored at the working directory; the UI settings file is read
    /// if present.
    pub fn new(
        app: AppInfo,
        mut options: Options,
    ) -> Result<Self, ConfigError> {
        for (name, root) in [
            ("assets", &mut options.assets_path),
            ("storage", &mut options.storage_path),
        ] {
            *root = std::path::absolute(&*root).map_err(|source| {
                ConfigError::RootUnavailable {
                    name,
                    path: root.clone(),
                    source,
                }
            })?;
        }

        let settings =
            read_settings(&PathResolver::new(&options).settings_file());
        if !settings.features.places {
            options.disable_places = true;
        }

        Ok(Self {
            app,
            options: RwLock::new(options),
            settings: RwLock::new(settings),
            storage: Mutex::new(StorageSlot::Empty),
            serial: OnceCell::new(),
            serial_checksum: OnceCell::new(),
            cpus: num_cpus::get(),
        })
    }

    /// Resolve options from every source and build the configuration. An
    /// `env-file` flag names the dotenv file to read.
    pub fn load(
        app: AppInfo,
        flags: &dyn FlagContext,
    ) -> Result<Self, ConfigError> {
        let mut loader = OptionsLoader::new(flags);
        if let Some(env_file) = flags.value("env-file") {
            loader = loader.with_env_file(env_file);
        }
        let load = loader.load()?;
        if let Some(path) = &load.metadata.options_file {
            info!(path = %path.display(), "options loaded");
        }
        Self::new(app, load.options)
    }

    /// Snapshot of the current options.
    pub fn options(&self) -> Options {
        self.options.read().clone()
    }

    /// Run `f` against one consistent view of the options.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&Options) -> T) -> T {
        f(&self.options.read())
    }

    fn paths<T>(&self, f: impl FnOnce(PathResolver<'_>) -> T) -> T {
        let options = self.options.read();
        f(PathResolver::new(&options))
    }

    pub fn name(&self) -> &str {
        &self.app.name
    }

    pub fn version(&self) -> &str {
        &self.app.version
    }

    pub fn copyright(&self) -> &str {
        &self.app.copyright
    }

    pub fn debug(&self) -> bool {
        self.read(|o| o.debug)
    }

    pub fn set_debug(&self, enabled: bool) {
        self.options.write().debug = enabled;
        debug!(enabled, "debug mode changed");
    }

    pub fn read_only(&self) -> bool {
        self.read(|o| o.read_only)
    }

    /// Waits for an in-flight settings update, so no update lands after
    /// read-only mode was switched on.
    pub fn set_read_only(&self, enabled: bool) {
        let _settings = self.settings.write();
        self.options.write().read_only = enabled;
        info!(enabled, "read-only mode changed");
    }

    pub fn demo(&self) -> bool {
        self.read(|o| o.demo)
    }

    pub fn public(&self) -> bool {
        self.read(|o| o.public)
    }

    pub fn experimental(&self) -> bool {
        self.read(|o| o.experimental)
    }

    pub fn admin_password(&self) -> String {
        self.read(|o| o.admin_password.clone())
    }

    pub fn places_enabled(&self) -> bool {
        self.read(|o| !o.disable_places)
    }

    pub fn set_places_enabled(&self, enabled: bool) {
        self.options.write().disable_places = !enabled;
        debug!(enabled, "reverse geocoding changed");
    }

    /// Geocoding provider, empty when geocoding is off.
    pub fn geo_api(&self) -> String {
        self.read(geo_api_of)
    }

    pub fn tensorflow_enabled(&self) -> bool {
        self.read(|o| !o.disable_tensorflow)
    }

    pub fn tensorflow_version(&self) -> &'static str {
        TENSORFLOW_VERSION
    }

    pub fn detect_nsfw(&self) -> bool {
        self.read(|o| o.detect_nsfw)
    }

    pub fn upload_nsfw(&self) -> bool {
        self.read(|o| o.upload_nsfw)
    }

    pub fn detach_server(&self) -> bool {
        self.read(|o| o.detach_server)
    }

    pub fn http_host(&self) -> String {
        self.read(|o| o.http_host.clone())
    }

    pub fn http_port(&self) -> u16 {
        self.read(|o| o.http_port)
    }

    pub fn http_mode(&self) -> String {
        self.read(|o| {
            if o.debug {
                HTTP_MODE_DEBUG.to_string()
            } else if o.http_mode.trim().is_empty() {
                HTTP_MODE_RELEASE.to_string()
            } else {
                o.http_mode.trim().to_string()
            }
        })
    }

    /// Public URL of the site, always ending in `/`.
    pub fn site_url(&self) -> String {
        self.read(site_url_of)
    }

    pub fn site_preview(&self) -> String {
        self.read(site_preview_of)
    }

    pub fn site_title(&self) -> String {
        self.read(|o| site_title_of(o, &self.app.name))
    }

    pub fn site_caption(&self) -> String {
        self.read(|o| o.site_caption.clone())
    }

    pub fn site_description(&self) -> String {
        self.read(|o| o.site_description.clone())
    }

    pub fn site_author(&self) -> String {
        self.read(|o| o.site_author.clone())
    }

    /// Maximum size of an original in bytes, `-1` for unlimited.
    pub fn originals_limit(&self) -> i64 {
        self.read(|o| {
            if o.originals_limit <= 0 {
                -1
            } else {
                o.originals_limit.saturating_mul(1024 * 1024)
            }
        })
    }

    pub fn workers(&self) -> usize {
        let configured = self.read(|o| o.workers);
        if (1..=self.cpus).contains(&configured) {
            configured
        } else {
            (self.cpus / 2).max(1)
        }
    }

    pub fn wakeup_interval(&self) -> Duration {
        let secs = self.read(|o| o.wakeup_interval);
        let secs = if secs <= 0 {
            DEFAULT_WAKEUP_INTERVAL_SECS
        } else {
            secs
        };
        Duration::from_secs(secs.unsigned_abs()).min(MAX_WAKEUP_INTERVAL)
    }

    /// Delay before indexing after an upload. Zero disables auto indexing.
    pub fn auto_index(&self) -> Duration {
        let secs = self.read(|o| o.auto_index);
        if secs <= 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(secs.unsigned_abs())
        }
    }

    /// Safety delay before importing. Zero means the importer is disabled.
    pub fn auto_import(&self) -> Duration {
        match self.read(|o| o.auto_import) {
            secs if secs < 0 => Duration::ZERO,
            0 => DEFAULT_AUTO_IMPORT_DELAY,
            secs if secs > MAX_AUTO_IMPORT_SECS => DEFAULT_AUTO_IMPORT_DELAY,
            secs => Duration::from_secs(secs.unsigned_abs()),
        }
    }

    pub fn thumb_quality(&self) -> u8 {
        self.read(|o| {
            o.thumb_quality.clamp(MIN_THUMB_QUALITY, MAX_THUMB_QUALITY)
        })
    }

    pub fn thumb_size(&self) -> u32 {
        self.read(thumb_size_of)
    }

    pub fn thumb_filter(&self) -> String {
        self.read(|o| o.thumb_filter.clone())
    }

    pub fn thumb_types(&self) -> Vec<ThumbType> {
        thumbs::available(self.thumb_size())
    }

    pub fn exiftool_bin(&self) -> String {
        self.read(|o| o.exiftool_bin.clone())
    }

    pub fn darktable_bin(&self) -> String {
        self.read(|o| o.darktable_bin.clone())
    }

    pub fn ffmpeg_bin(&self) -> String {
        self.read(|o| o.ffmpeg_bin.clone())
    }

    pub fn database_driver(&self) -> String {
        self.paths(|p| p.database_driver())
    }

    pub fn database_dsn(&self) -> String {
        self.paths(|p| p.database_dsn())
    }

    pub fn assets_path(&self) -> PathBuf {
        self.paths(|p| p.assets())
    }

    pub fn storage_path(&self) -> PathBuf {
        self.paths(|p| p.storage())
    }

    pub fn originals_path(&self) -> PathBuf {
        self.paths(|p| p.originals())
    }

    pub fn import_path(&self) -> PathBuf {
        self.paths(|p| p.import())
    }

    pub fn cache_path(&self) -> PathBuf {
        self.paths(|p| p.cache())
    }

    pub fn thumb_path(&self) -> PathBuf {
        self.paths(|p| p.thumbnails())
    }

    pub fn backup_path(&self) -> PathBuf {
        self.paths(|p| p.backup())
    }

    pub fn temp_path(&self) -> PathBuf {
        self.paths(|p| p.temp())
    }

    pub fn config_path(&self) -> PathBuf {
        self.paths(|p| p.config())
    }

    pub fn config_file(&self) -> PathBuf {
        self.paths(|p| p.config_file())
    }

    pub fn settings_file(&self) -> PathBuf {
        self.paths(|p| p.settings_file())
    }

    pub fn pid_filename(&self) -> PathBuf {
        self.paths(|p| p.pid_file())
    }

    pub fn log_filename(&self) -> PathBuf {
        self.paths(|p| p.log_file())
    }

    pub fn templates_path(&self) -> PathBuf {
        self.paths(|p| p.templates())
    }

    pub fn static_path(&self) -> PathBuf {
        self.paths(|p| p.static_files())
    }

    pub fn build_path(&self) -> PathBuf {
        self.paths(|p| p.build())
    }

    pub fn img_path(&self) -> PathBuf {
        self.paths(|p| p.img())
    }

    pub fn nsfw_model_path(&self) -> PathBuf {
        self.paths(|p| p.nsfw_model())
    }

    pub fn tensorflow_model_path(&self) -> PathBuf {
        self.paths(|p| p.tensorflow_model())
    }

    pub fn examples_path(&self) -> PathBuf {
        self.paths(|p| p.examples())
    }

    pub fn js_bundle(&self) -> PathBuf {
        self.paths(|p| p.js_bundle())
    }

    pub fn css_bundle(&self) -> PathBuf {
        self.paths(|p| p.css_bundle())
    }

    /// Every derived location by name.
    pub fn path_entries(&self) -> Vec<(&'static str, PathBuf)> {
        self.paths(|p| p.entries())
    }

    /// Installation identifier. Computed on first use and stable for the
    /// lifetime of this value.
    pub fn serial(&self) -> &str {
        self.serial.get_or_init(|| {
            let (storage, originals) =
                self.paths(|p| (p.storage(), p.originals()));
            let machine_id = match fs::read_to_string(MACHINE_ID_FILE) {
                Ok(id) => id.trim().to_string(),
                Err(err) => {
                    debug!(error = %err, "machine id unavailable");
                    String::new()
                }
            };
            let seed = format!(
                "{}\n{}\n{}\n{}",
                self.app.name,
                machine_id,
                storage.display(),
                originals.display()
            );
            format!("z{}", short_hash(&seed, 15))
        })
    }

    pub fn serial_checksum(&self) -> &str {
        self.serial_checksum
            .get_or_init(|| short_hash(self.serial(), 8))
    }

    /// Hand the storage handle to the configuration, which closes it on
    /// [`Config::close`]. Attaching after close is refused.
    pub fn attach_storage(
        &self,
        handle: Arc<dyn StorageHandle>,
    ) -> Result<(), ConfigError> {
        let mut slot = self.storage.lock();
        if matches!(*slot, StorageSlot::Closed) {
            return Err(ConfigError::Closed);
        }
        *slot = StorageSlot::Open(handle);
        Ok(())
    }

    /// The attached storage handle, `None` if nothing was attached yet.
    pub fn storage(
        &self,
    ) -> Result<Option<Arc<dyn StorageHandle>>, ConfigError> {
        match &*self.storage.lock() {
            StorageSlot::Empty => Ok(None),
            StorageSlot::Open(handle) => Ok(Some(Arc::clone(handle))),
            StorageSlot::Closed => Err(ConfigError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.storage.lock(), StorageSlot::Closed)
    }

    /// Release the storage handle. The first call wins; later calls return
    /// `Ok(())`. A failing handle is still dropped and the configuration
    /// stays closed.
    pub fn close(&self) -> Result<(), StorageError> {
        let previous =
            std::mem::replace(&mut *self.storage.lock(), StorageSlot::Closed);

        match previous {
            StorageSlot::Open(handle) => {
                info!("closing storage");
                handle.close()
            }
            StorageSlot::Empty => Ok(()),
            StorageSlot::Closed => {
                debug!("config already closed");
                Ok(())
            }
        }
    }

    /// Create the storage tree the application writes into.
    pub fn create_directories(&self) -> Result<(), PathError> {
        let dirs = self.paths(|p| p.directories());
        for dir in dirs {
            fs::create_dir_all(&dir).map_err(|source| PathError::Create {
                path: dir.clone(),
                source,
            })?;
            debug!(path = %dir.display(), "directory ready");
        }
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Validate and persist new UI settings, then apply the places toggle to
    /// the runtime geocoding flag.
    pub fn update_settings(
        &self,
        settings: Settings,
    ) -> Result<(), ConfigError> {
        settings.validate().map_err(ConfigError::InvalidSettings)?;
        let yaml = serde_yaml::to_string(&settings)
            .map_err(ConfigError::SettingsFormat)?;

        let mut current = self.settings.write();
        if self.read_only() {
            return Err(ConfigError::ReadOnly);
        }
        let (dir, path) = self.paths(|p| (p.config(), p.settings_file()));
        write_atomic(&dir, &path, yaml.as_bytes())?;
        self.set_places_enabled(settings.features.places);
        *current = settings;
        info!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Mutate options in place. The assets and storage roots are restored
    /// afterwards since every derived path depends on them.
    #[cfg(any(test, feature = "testing"))]
    pub fn override_options(&self, f: impl FnOnce(&mut Options)) {
        let mut options = self.options.write();
        let assets = options.assets_path.clone();
        let storage = options.storage_path.clone();
        f(&mut options);
        options.assets_path = assets;
        options.storage_path = storage;
    }
}

pub(crate) fn site_url_of(o: &Options) -> String {
    let configured = o.site_url.trim();
    let mut url = if configured.is_empty() {
        let host = match o.http_host.trim() {
            "" | "0.0.0.0" | "::" | "[::]" => "localhost".to_string(),
            host if host.contains(':') && !host.starts_with('[') => {
                format!("[{host}]")
            }
            host => host.to_string(),
        };
        format!("http://{host}:{}/", o.http_port)
    } else {
        configured.to_string()
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

pub(crate) fn site_preview_of(o: &Options) -> String {
    let preview = o.site_preview.trim();
    if preview.is_empty() {
        return format!("{}{DEFAULT_SITE_PREVIEW}", site_url_of(o));
    }
    if Url::parse(preview).is_ok_and(|url| url.has_host()) {
        return preview.to_string();
    }
    format!("{}{}", site_url_of(o), preview.trim_start_matches('/'))
}

pub(crate) fn site_title_of(o: &Options, name: &str) -> String {
    match o.site_title.trim() {
        "" => name.to_string(),
        title => title.to_string(),
    }
}

pub(crate) fn geo_api_of(o: &Options) -> String {
    if o.disable_places {
        String::new()
    } else {
        GEO_API_PLACES.to_string()
    }
}

pub(crate) fn thumb_size_of(o: &Options) -> u32 {
    o.thumb_size.clamp(MIN_THUMB_SIZE, MAX_THUMB_SIZE)
}

fn read_settings(path: &Path) -> Settings {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return Settings::default(),
    };
    match serde_yaml::from_str::<Option<Settings>>(&contents) {
        Ok(settings) => settings.unwrap_or_default(),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "ignoring unreadable settings file"
            );
            Settings::default()
        }
    }
}

fn write_atomic(dir: &Path, path: &Path, data: &[u8]) -> Result<(), PathError> {
    fs::create_dir_all(dir).map_err(|source| PathError::Create {
        path: dir.to_path_buf(),
        source,
    })?;
    let write_err = |source| PathError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(data).map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}
