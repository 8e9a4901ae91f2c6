//! Derived filesystem locations.
//!
//! Every location is either an explicit override from [`Options`] or a fixed
//! suffix under one of the roots. Nothing here touches the filesystem; the
//! roots were made absolute when the options were loaded.

use std::path::{Path, PathBuf};

use crate::{
    constants::{
        CSS_BUNDLE, DEFAULT_DATABASE_DRIVER, JS_BUNDLE, LOG_FILENAME,
        OPTIONS_FILENAME, PID_FILENAME, SETTINGS_FILENAME, SQLITE_FILENAME,
    },
    models::Options,
    util::absolute_from,
};

#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    options: &'a Options,
}

/// Override if set, else `root/suffix`. A relative override replaces the
/// suffix and is still anchored at `root`.
fn derive(override_path: Option<&Path>, root: &Path, suffix: &str) -> PathBuf {
    match override_path.filter(|p| !p.as_os_str().is_empty()) {
        Some(path) => absolute_from(path, Some(root)),
        None => root.join(suffix),
    }
}

impl<'a> PathResolver<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    pub fn assets(&self) -> PathBuf {
        absolute_from(&self.options.assets_path, None)
    }

    pub fn storage(&self) -> PathBuf {
        absolute_from(&self.options.storage_path, None)
    }

    pub fn originals(&self) -> PathBuf {
        derive(
            self.options.originals_path.as_deref(),
            &self.storage(),
            "originals",
        )
    }

    pub fn import(&self) -> PathBuf {
        derive(self.options.import_path.as_deref(), &self.storage(), "import")
    }

    pub fn cache(&self) -> PathBuf {
        derive(self.options.cache_path.as_deref(), &self.storage(), "cache")
    }

    pub fn thumbnails(&self) -> PathBuf {
        self.cache().join("thumbnails")
    }

    pub fn backup(&self) -> PathBuf {
        derive(self.options.backup_path.as_deref(), &self.storage(), "backup")
    }

    pub fn temp(&self) -> PathBuf {
        derive(self.options.temp_path.as_deref(), &self.cache(), "temp")
    }

    pub fn config(&self) -> PathBuf {
        derive(self.options.config_path.as_deref(), &self.storage(), "config")
    }

    pub fn config_file(&self) -> PathBuf {
        derive(
            self.options.config_file.as_deref(),
            &self.config(),
            OPTIONS_FILENAME,
        )
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config().join(SETTINGS_FILENAME)
    }

    pub fn pid_file(&self) -> PathBuf {
        derive(
            self.options.pid_filename.as_deref(),
            &self.storage(),
            PID_FILENAME,
        )
    }

    pub fn log_file(&self) -> PathBuf {
        derive(
            self.options.log_filename.as_deref(),
            &self.storage(),
            LOG_FILENAME,
        )
    }

    pub fn templates(&self) -> PathBuf {
        derive(
            self.options.templates_path.as_deref(),
            &self.assets(),
            "templates",
        )
    }

    pub fn static_files(&self) -> PathBuf {
        derive(self.options.static_path.as_deref(), &self.assets(), "static")
    }

    pub fn build(&self) -> PathBuf {
        derive(
            self.options.build_path.as_deref(),
            &self.static_files(),
            "build",
        )
    }

    pub fn img(&self) -> PathBuf {
        derive(self.options.img_path.as_deref(), &self.static_files(), "img")
    }

    pub fn nsfw_model(&self) -> PathBuf {
        self.assets().join("nsfw")
    }

    pub fn tensorflow_model(&self) -> PathBuf {
        self.assets().join("nasnet")
    }

    pub fn examples(&self) -> PathBuf {
        self.assets().join("examples")
    }

    pub fn js_bundle(&self) -> PathBuf {
        self.build().join(JS_BUNDLE)
    }

    pub fn css_bundle(&self) -> PathBuf {
        self.build().join(CSS_BUNDLE)
    }

    /// Data source name handed to the database layer. SQLite defaults to a
    /// file in the storage root; other drivers need an explicit DSN.
    pub fn database_dsn(&self) -> String {
        let dsn = self.options.database_dsn.trim();
        if !dsn.is_empty() {
            return dsn.to_string();
        }
        if self.database_driver() == DEFAULT_DATABASE_DRIVER {
            return self.storage().join(SQLITE_FILENAME).display().to_string();
        }
        String::new()
    }

    pub fn database_driver(&self) -> String {
        let driver = self.options.database_driver.trim().to_ascii_lowercase();
        match driver.as_str() {
            "" | "sqlite3" => DEFAULT_DATABASE_DRIVER.to_string(),
            "tidb" | "mariadb" => "mysql".to_string(),
            _ => driver,
        }
    }

    /// Directories the application expects to exist, in creation order.
    pub fn directories(&self) -> Vec<PathBuf> {
        vec![
            self.storage(),
            self.originals(),
            self.import(),
            self.cache(),
            self.thumbnails(),
            self.backup(),
            self.temp(),
            self.config(),
        ]
    }

    /// Every named location, for display.
    pub fn entries(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("assets", self.assets()),
            ("storage", self.storage()),
            ("originals", self.originals()),
            ("import", self.import()),
            ("cache", self.cache()),
            ("thumbnails", self.thumbnails()),
            ("backup", self.backup()),
            ("temp", self.temp()),
            ("config", self.config()),
            ("config-file", self.config_file()),
            ("settings-file", self.settings_file()),
            ("pid-file", self.pid_file()),
            ("log-file", self.log_file()),
            ("templates", self.templates()),
            ("static", self.static_files()),
            ("build", self.build()),
            ("img", self.img()),
            ("nsfw-model", self.nsfw_model()),
            ("tensorflow-model", self.tensorflow_model()),
            ("examples", self.examples()),
            ("js-bundle", self.js_bundle()),
            ("css-bundle", self.css_bundle()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Options {
        Options {
            assets_path: PathBuf::from("/srv/lumina/assets"),
            storage_path: PathBuf::from("/srv/lumina/storage"),
            ..Options::default()
        }
    }

    #[test]
    fn defaults_hang_off_the_roots() {
        let options = options();
        let paths = PathResolver::new(&options);

        assert_eq!(paths.cache(), paths.storage().join("cache"));
        assert_eq!(paths.thumbnails(), paths.cache().join("thumbnails"));
        assert_eq!(
            paths.temp(),
            PathBuf::from("/srv/lumina/storage/cache/temp")
        );
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/srv/lumina/storage/config/options.yml")
        );
        assert_eq!(
            paths.settings_file(),
            PathBuf::from("/srv/lumina/storage/config/settings.yml")
        );
        assert_eq!(
            paths.pid_file(),
            PathBuf::from("/srv/lumina/storage/lumina.pid")
        );
        assert_eq!(
            paths.build(),
            PathBuf::from("/srv/lumina/assets/static/build")
        );
        assert_eq!(
            paths.img(),
            PathBuf::from("/srv/lumina/assets/static/img")
        );
        assert_eq!(
            paths.nsfw_model(),
            PathBuf::from("/srv/lumina/assets/nsfw")
        );
        assert_eq!(
            paths.tensorflow_model(),
            PathBuf::from("/srv/lumina/assets/nasnet")
        );
        assert_eq!(
            paths.js_bundle(),
            PathBuf::from("/srv/lumina/assets/static/build/app.js")
        );
    }

    #[test]
    fn overrides_win_and_move_dependent_paths() {
        let options = Options {
            cache_path: Some(PathBuf::from("/var/cache/lumina")),
            static_path: Some(PathBuf::from("public")),
            ..options()
        };
        let paths = PathResolver::new(&options);

        assert_eq!(paths.cache(), PathBuf::from("/var/cache/lumina"));
        assert_eq!(
            paths.thumbnails(),
            PathBuf::from("/var/cache/lumina/thumbnails")
        );
        assert_eq!(
            paths.static_files(),
            PathBuf::from("/srv/lumina/assets/public")
        );
        assert_eq!(
            paths.css_bundle(),
            PathBuf::from("/srv/lumina/assets/public/build/app.css")
        );
    }

    #[test]
    fn empty_override_is_ignored() {
        let options = Options {
            backup_path: Some(PathBuf::new()),
            ..options()
        };
        let paths = PathResolver::new(&options);
        assert_eq!(paths.backup(), PathBuf::from("/srv/lumina/storage/backup"));
    }

    #[test]
    fn every_entry_is_absolute() {
        let options = options();
        for (name, path) in PathResolver::new(&options).entries() {
            assert!(path.is_absolute(), "{name} is not absolute");
        }
    }

    #[test]
    fn sqlite_dsn_defaults_into_storage() {
        let options = options();
        let paths = PathResolver::new(&options);
        assert_eq!(paths.database_driver(), "sqlite");
        assert_eq!(paths.database_dsn(), "/srv/lumina/storage/index.db");

        let options = Options {
            database_driver: "MariaDB".to_string(),
            ..options
        };
        let paths = PathResolver::new(&options);
        assert_eq!(paths.database_driver(), "mysql");
        assert_eq!(paths.database_dsn(), "");
    }
}
