use std::{fs, path::Path, sync::Arc};

use lumina_config::{
    AppInfo, Config, Options, StorageError, StorageHandle,
};
use tempfile::tempdir;

fn config(dir: &Path) -> Config {
    let options = Options {
        assets_path: dir.join("assets"),
        storage_path: dir.join("storage"),
        admin_password: "hunter2-secret".to_string(),
        site_title: "Holiday Archive".to_string(),
        ..Options::default()
    };
    let config =
        Config::new(AppInfo::new("Lumina", "2024.1", "(c) Family"), options)
            .unwrap();
    fs::create_dir_all(config.build_path()).unwrap();
    fs::write(config.js_bundle(), "export default 1;").unwrap();
    fs::write(config.css_bundle(), ".app { color: red }").unwrap();
    config
}

#[test]
fn client_config_wire_format() {
    let dir = tempdir().expect("tempdir");
    let config = config(dir.path());

    let value = serde_json::to_value(config.user_config()).unwrap();
    assert_eq!(value["name"], "Lumina");
    assert_eq!(value["version"], "2024.1");
    assert_eq!(value["copyright"], "(c) Family");
    assert_eq!(value["siteTitle"], "Holiday Archive");
    assert_eq!(
        value["sitePreview"],
        "http://localhost:2342/static/img/preview.jpg"
    );
    assert_eq!(value["geoApi"], "places");
    assert_eq!(value["readOnly"], false);
    assert_eq!(value["settings"]["theme"], "default");
    assert_eq!(value["settings"]["features"]["places"], true);
    assert!(value["thumbs"].as_array().is_some_and(|t| !t.is_empty()));
    assert_eq!(value["jsHash"].as_str().map(str::len), Some(16));
    assert_eq!(value["cssHash"].as_str().map(str::len), Some(16));

    let raw = value.to_string();
    assert!(!raw.contains("hunter2-secret"));
    assert!(!raw.contains("index.db"));
}

struct NoopStorage;

impl StorageHandle for NoopStorage {
    fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[test]
fn readers_survive_concurrent_toggles_and_close() {
    let dir = tempdir().expect("tempdir");
    let config = Arc::new(config(dir.path()));
    config.attach_storage(Arc::new(NoopStorage)).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let config = Arc::clone(&config);
            scope.spawn(move || {
                for _ in 0..200 {
                    let client = config.user_config();
                    assert!(!client.name.is_empty());
                    assert!(client.site_url.ends_with('/'));
                }
            });
        }

        let writer = Arc::clone(&config);
        scope.spawn(move || {
            for i in 0..200 {
                writer.set_read_only(i % 2 == 0);
            }
            writer.set_read_only(true);
            writer.close().unwrap();
        });
    });

    assert!(config.read_only());
    assert!(config.user_config().read_only);
    assert!(config.is_closed());
    assert!(config.close().is_ok());
}
