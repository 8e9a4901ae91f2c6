//! The public, client-safe view of the configuration.

use serde::Serialize;
use tracing::warn;

use crate::{
    checksum::hash_file,
    config::{
        Config, geo_api_of, site_preview_of, site_title_of, site_url_of,
        thumb_size_of,
    },
    constants::CLIENT_HASH_LEN,
    models::settings::Settings,
    paths::PathResolver,
    thumbs::{self, ThumbType},
};

/// Configuration sent to the web client. Field names are part of the wire
/// format. Holds no secrets and no filesystem paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub name: String,
    pub version: String,
    pub copyright: String,
    pub debug: bool,
    pub demo: bool,
    pub read_only: bool,
    pub public: bool,
    pub experimental: bool,
    pub upload_nsfw: bool,
    pub site_url: String,
    pub site_preview: String,
    pub site_title: String,
    pub site_caption: String,
    pub site_description: String,
    pub site_author: String,
    pub geo_api: String,
    pub thumbs: Vec<ThumbType>,
    pub js_hash: String,
    pub css_hash: String,
    pub settings: Settings,
}

impl Config {
    /// Build the client config. Option-derived fields come from a single
    /// view of the options, so a concurrent toggle is either fully in or
    /// fully out. Bundle hashes are read from disk on every call so a
    /// rebuilt frontend is picked up without a restart.
    pub fn user_config(&self) -> ClientConfig {
        let (mut client, js_bundle, css_bundle) = self.read(|o| {
            let paths = PathResolver::new(o);
            let client = ClientConfig {
                name: self.name().to_string(),
                version: self.version().to_string(),
                copyright: self.copyright().to_string(),
                debug: o.debug,
                demo: o.demo,
                read_only: o.read_only,
                public: o.public,
                experimental: o.experimental,
                upload_nsfw: o.upload_nsfw,
                site_url: site_url_of(o),
                site_preview: site_preview_of(o),
                site_title: site_title_of(o, self.name()),
                site_caption: o.site_caption.clone(),
                site_description: o.site_description.clone(),
                site_author: o.site_author.clone(),
                geo_api: geo_api_of(o),
                thumbs: thumbs::available(thumb_size_of(o)),
                js_hash: String::new(),
                css_hash: String::new(),
                settings: Settings::default(),
            };
            (client, paths.js_bundle(), paths.css_bundle())
        });

        client.js_hash = bundle_hash(&js_bundle);
        client.css_hash = bundle_hash(&css_bundle);
        client.settings = self.settings();
        client
    }
}

fn bundle_hash(path: &std::path::Path) -> String {
    match hash_file(path) {
        Ok(mut hash) => {
            hash.truncate(CLIENT_HASH_LEN);
            hash
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "bundle not hashed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppInfo, Options};
    use std::fs;

    fn config_with_bundles(dir: &std::path::Path) -> Config {
        let options = Options {
            assets_path: dir.join("assets"),
            storage_path: dir.join("storage"),
            admin_password: "hunter2-admin".to_string(),
            database_dsn: "lumina:db-secret@tcp(db:3306)/lumina".to_string(),
            ..Options::default()
        };
        let config =
            Config::new(AppInfo::new("Lumina", "1.0.0", ""), options).unwrap();
        fs::create_dir_all(config.build_path()).unwrap();
        fs::write(config.js_bundle(), "console.log('v1')").unwrap();
        fs::write(config.css_bundle(), "body { margin: 0 }").unwrap();
        config
    }

    #[test]
    fn hashes_follow_bundle_contents() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_bundles(dir.path());

        let first = config.user_config();
        assert_eq!(first.js_hash.len(), CLIENT_HASH_LEN);
        assert_eq!(first.css_hash.len(), CLIENT_HASH_LEN);
        assert_eq!(config.user_config().js_hash, first.js_hash);

        fs::write(config.js_bundle(), "console.log('v2')").unwrap();
        let second = config.user_config();
        assert_ne!(second.js_hash, first.js_hash);
        assert_eq!(second.css_hash, first.css_hash);
    }

    #[test]
    fn missing_bundles_give_empty_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_bundles(dir.path());
        fs::remove_file(config.css_bundle()).unwrap();

        let client = config.user_config();
        assert!(!client.js_hash.is_empty());
        assert!(client.css_hash.is_empty());
    }

    #[test]
    fn serialized_form_has_no_secrets_or_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_bundles(dir.path());

        let json = serde_json::to_string(&config.user_config()).unwrap();
        assert!(!json.contains("hunter2-admin"));
        assert!(!json.contains("db-secret"));
        assert!(!json.contains(&dir.path().display().to_string()));
        assert!(json.contains("\"jsHash\""));
        assert!(json.contains("\"siteUrl\":\"http://localhost:2342/\""));
    }

    #[test]
    fn runtime_flags_are_current() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_bundles(dir.path());
        assert!(!config.user_config().read_only);

        config.set_read_only(true);
        config.set_places_enabled(false);
        let client = config.user_config();
        assert!(client.read_only);
        assert_eq!(client.geo_api, "");
        assert_eq!(client.name, "Lumina");
        assert_eq!(client.version, "1.0.0");
        assert!(!client.thumbs.is_empty());
    }

    #[test]
    fn snapshot_never_mixes_before_and_after_values() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_bundles(dir.path());

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..500 {
                    let locked = i % 2 == 0;
                    config.override_options(|o| {
                        o.read_only = locked;
                        o.disable_places = locked;
                        o.site_url = if locked {
                            "https://locked.example/".into()
                        } else {
                            String::new()
                        };
                    });
                }
            });

            for _ in 0..200 {
                let client = config.user_config();
                assert_eq!(client.read_only, client.geo_api.is_empty());
                assert_eq!(
                    client.read_only,
                    client.site_preview.starts_with("https://locked.example/")
                );
            }
        });
    }
}
