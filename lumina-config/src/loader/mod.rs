pub mod error;

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    cli::FlagContext,
    constants::OPTIONS_FILENAME,
    models::{
        Options,
        sources::{FileFormat, OptionsLayer},
    },
    util::absolute_from,
};

use error::ConfigError;

/// Where environment variables are read from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The live process environment.
    #[default]
    Process,
    /// A fixed map, used by tests and embedders that must not read the
    /// process environment.
    Snapshot(HashMap<String, String>),
}

impl EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Snapshot(vars) => vars.get(name).cloned(),
        }
    }
}

/// Resolves [`Options`] from compiled-in defaults, the options file, the
/// environment and command-line flags, in increasing precedence.
pub struct OptionsLoader<'a> {
    flags: &'a dyn FlagContext,
    env: EnvSource,
    env_file: Option<PathBuf>,
    resolve_binaries: bool,
}

impl fmt::Debug for OptionsLoader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsLoader")
            .field("env", &self.env)
            .field("env_file", &self.env_file)
            .field("resolve_binaries", &self.resolve_binaries)
            .finish_non_exhaustive()
    }
}

/// Result of a load: the options plus where they came from.
#[derive(Debug, Clone)]
pub struct OptionsLoad {
    pub options: Options,
    pub metadata: LoadMetadata,
}

#[derive(Debug, Clone, Default)]
pub struct LoadMetadata {
    /// Options file that was read, if any.
    pub options_file: Option<PathBuf>,
    /// Dotenv file that contributed variables, if any.
    pub env_file: Option<PathBuf>,
}

impl<'a> OptionsLoader<'a> {
    pub fn new(flags: &'a dyn FlagContext) -> Self {
        Self {
            flags,
            env: EnvSource::Process,
            env_file: None,
            resolve_binaries: true,
        }
    }

    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Dotenv file consulted for variables missing from the environment.
    /// Without one, `.env` in the working directory is tried.
    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Skip the `PATH` lookup for external binaries and keep the configured
    /// names verbatim.
    pub fn without_binary_lookup(mut self) -> Self {
        self.resolve_binaries = false;
        self
    }

    pub fn load(&self) -> Result<OptionsLoad, ConfigError> {
        let (dotenv, env_file) = self.read_env_file()?;

        let env_layer = OptionsLayer::from_env(|name| {
            self.env.get(name).or_else(|| dotenv.get(name).cloned())
        })?;
        let flag_layer = OptionsLayer::from_flags(self.flags)?;

        let mut early = env_layer.clone();
        early.merge_from(flag_layer.clone());
        let (options_file, explicit) = locate_options_file(&early);

        let file_layer = if options_file.exists() {
            info!(path = %options_file.display(), "loading options file");
            Some(OptionsLayer::from_file(&options_file)?)
        } else if explicit {
            return Err(ConfigError::MissingFile { path: options_file });
        } else {
            debug!(
                path = %options_file.display(),
                "no options file, using defaults"
            );
            None
        };

        let loaded_file = file_layer.as_ref().map(|_| options_file);
        let mut merged = file_layer.map(without_location).unwrap_or_default();
        merged.merge_from(env_layer);
        merged.merge_from(flag_layer);

        let mut options = merged.into_options();
        resolve_roots(&mut options)?;
        if let Some(path) = &loaded_file {
            options.config_file = Some(path.clone());
            if !explicit {
                options.config_path = path.parent().map(Path::to_path_buf);
            }
        }
        if self.resolve_binaries {
            resolve_binaries(&mut options);
        }

        Ok(OptionsLoad {
            options,
            metadata: LoadMetadata {
                options_file: loaded_file,
                env_file,
            },
        })
    }

    fn read_env_file(
        &self,
    ) -> Result<(HashMap<String, String>, Option<PathBuf>), ConfigError> {
        let path = self
            .env_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(".env"));

        let iter = match dotenvy::from_path_iter(&path) {
            Ok(iter) => iter,
            Err(dotenvy::Error::Io(_)) => {
                if self.env_file.is_some() {
                    warn!(path = %path.display(), "env file not readable");
                }
                return Ok((HashMap::new(), None));
            }
            Err(err) => return Err(err.into()),
        };

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        debug!(path = %path.display(), count = vars.len(), "read env file");
        Ok((vars, Some(path)))
    }
}

/// Options file location, and whether it was named explicitly. Only the
/// environment and flags are consulted; the file cannot relocate itself.
/// An explicit file is taken relative to the working directory, a config
/// path relative to the storage root.
fn locate_options_file(early: &OptionsLayer) -> (PathBuf, bool) {
    if let Some(path) = &early.config_file {
        return (absolute_from(path, None), true);
    }

    let storage = early
        .storage_path
        .clone()
        .unwrap_or_else(|| Options::default().storage_path);
    let storage = absolute_from(&storage, None);
    let config_path = match &early.config_path {
        Some(path) => absolute_from(path, Some(&storage)),
        None => storage.join("config"),
    };

    (config_path.join(OPTIONS_FILENAME), false)
}

/// Drop the keys that locate the options file. Only the environment and
/// flags may move it.
fn without_location(mut layer: OptionsLayer) -> OptionsLayer {
    for (key, value) in [
        ("config-path", layer.config_path.take()),
        ("config-file", layer.config_file.take()),
    ] {
        if let Some(value) = value {
            warn!(
                key,
                value = %value.display(),
                "ignored in options file, set it in the environment or flags"
            );
        }
    }
    layer
}

/// Make the assets and storage roots absolute and make sure they exist.
/// This is the only filesystem work done on behalf of derived paths.
fn resolve_roots(options: &mut Options) -> Result<(), ConfigError> {
    for (name, root) in [
        ("assets", &mut options.assets_path),
        ("storage", &mut options.storage_path),
    ] {
        let absolute = std::path::absolute(&*root).map_err(|source| {
            ConfigError::RootUnavailable {
                name,
                path: root.clone(),
                source,
            }
        })?;

        if !absolute.is_dir() {
            fs::create_dir_all(&absolute).map_err(|source| {
                ConfigError::RootUnavailable {
                    name,
                    path: absolute.clone(),
                    source,
                }
            })?;
            info!(path = %absolute.display(), "created {name} root");
        }

        *root = absolute;
    }

    Ok(())
}

fn resolve_binaries(options: &mut Options) {
    for bin in [
        &mut options.exiftool_bin,
        &mut options.darktable_bin,
        &mut options.ffmpeg_bin,
    ] {
        match which::which(Path::new(bin.as_str())) {
            Ok(found) => *bin = found.display().to_string(),
            Err(_) => debug!(binary = %bin, "not found on PATH"),
        }
    }
}

/// Check that a file can be parsed as options without loading anything
/// else. Used by `lumina-config check`.
pub fn validate_options_file(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    OptionsLayer::from_file(path).map(|_| ())?;
    debug!(
        path = %path.display(),
        format = ?FileFormat::from_path(path),
        "options file is valid"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StaticFlags;

    fn rooted(dir: &Path) -> StaticFlags {
        StaticFlags::new()
            .set("assets-path", dir.join("assets").display().to_string())
            .set("storage-path", dir.join("storage").display().to_string())
    }

    #[test]
    fn options_file_defaults_under_storage_config() {
        let early = OptionsLayer {
            storage_path: Some(PathBuf::from("/srv/storage")),
            ..OptionsLayer::default()
        };
        let (path, explicit) = locate_options_file(&early);
        assert_eq!(path, PathBuf::from("/srv/storage/config/options.yml"));
        assert!(!explicit);
    }

    #[test]
    fn config_path_moves_the_options_file() {
        let early = OptionsLayer {
            storage_path: Some(PathBuf::from("/srv/storage")),
            config_path: Some(PathBuf::from("/etc/lumina")),
            ..OptionsLayer::default()
        };
        let (path, explicit) = locate_options_file(&early);
        assert_eq!(path, PathBuf::from("/etc/lumina/options.yml"));
        assert!(!explicit);
    }

    #[test]
    fn config_file_is_explicit() {
        let early = OptionsLayer {
            config_file: Some(PathBuf::from("/etc/lumina/custom.toml")),
            ..OptionsLayer::default()
        };
        let (path, explicit) = locate_options_file(&early);
        assert_eq!(path, PathBuf::from("/etc/lumina/custom.toml"));
        assert!(explicit);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yml");
        let flags = rooted(dir.path())
            .set("config-file", missing.display().to_string());

        let err = OptionsLoader::new(&flags)
            .with_env(EnvSource::Snapshot(HashMap::new()))
            .with_env_file(dir.path().join(".env"))
            .without_binary_lookup()
            .load()
            .expect_err("explicit file must exist");
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn roots_are_created_and_made_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("nested").join("storage");
        let flags = rooted(dir.path())
            .set("storage-path", storage.display().to_string());

        let load = OptionsLoader::new(&flags)
            .with_env(EnvSource::Snapshot(HashMap::new()))
            .with_env_file(dir.path().join(".env"))
            .without_binary_lookup()
            .load()
            .unwrap();

        assert!(storage.is_dir());
        assert!(load.options.storage_path.is_absolute());
        assert!(load.metadata.options_file.is_none());
        assert!(load.metadata.env_file.is_none());
    }

    #[test]
    fn env_file_fills_in_missing_variables() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join("lumina.env");
        fs::write(
            &env_file,
            "LUMINA_HTTP_PORT=9000\nLUMINA_SITE_TITLE=FromDotenv\n",
        )
        .unwrap();

        let flags = rooted(dir.path());
        let env = HashMap::from([(
            "LUMINA_SITE_TITLE".to_string(),
            "FromEnv".to_string(),
        )]);

        let load = OptionsLoader::new(&flags)
            .with_env(EnvSource::Snapshot(env))
            .with_env_file(&env_file)
            .without_binary_lookup()
            .load()
            .unwrap();

        assert_eq!(load.options.http_port, 9000);
        assert_eq!(load.options.site_title, "FromEnv");
        assert_eq!(load.metadata.env_file, Some(env_file));
    }

    #[test]
    fn options_file_cannot_relocate_itself() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("storage").join("config");
        fs::create_dir_all(&config_dir).unwrap();
        let options_file = config_dir.join("options.yml");
        fs::write(
            &options_file,
            "config-path: /elsewhere\nconfig-file: /elsewhere/o.yml\n",
        )
        .unwrap();

        let load = OptionsLoader::new(&rooted(dir.path()))
            .with_env(EnvSource::Snapshot(HashMap::new()))
            .with_env_file(dir.path().join(".env"))
            .without_binary_lookup()
            .load()
            .unwrap();

        assert_eq!(load.metadata.options_file, Some(options_file.clone()));
        assert_eq!(load.options.config_file, Some(options_file));
        assert_eq!(load.options.config_path, Some(config_dir));
    }
}
