use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Parse a boolean value from a raw string, accepting common env-style forms.
///
/// Accepted truthy values (case-insensitive): `"1"`, `"true"`, `"yes"`, `"on"`.
/// Accepted falsy values: `"0"`, `"false"`, `"no"`, `"off"`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse an interval. A bare integer is read as seconds (negative values are
/// kept so callers can treat them as "disabled"); anything else goes through
/// `humantime`, e.g. `15m` or `2h 30m`.
pub fn parse_seconds(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(secs) = trimmed.parse::<i64>() {
        return Some(secs);
    }
    humantime::parse_duration(trimmed)
        .ok()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
}

/// Render a seconds value the way `parse_seconds` reads it back.
pub fn format_seconds(secs: i64) -> String {
    if secs <= 0 {
        return secs.to_string();
    }
    humantime::format_duration(Duration::from_secs(secs.unsigned_abs()))
        .to_string()
}

/// Make `path` absolute without touching the filesystem beyond reading the
/// current working directory. Relative paths are joined onto `base` when one
/// is given.
pub fn absolute_from(path: &Path, base: Option<&Path>) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let joined = match base {
        Some(base) => base.join(path),
        None => path.to_path_buf(),
    };

    std::path::absolute(&joined).unwrap_or(joined)
}

/// Trimmed, non-empty string or `None`.
pub fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Environment variable that feeds the option `key`, e.g.
/// `assets-path` -> `LUMINA_ASSETS_PATH`.
pub fn env_var_name(key: &str) -> String {
    format!(
        "{}{}",
        crate::constants::ENV_PREFIX,
        key.to_ascii_uppercase().replace('-', "_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_env_forms() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_seconds_reads_plain_and_humantime_values() {
        assert_eq!(parse_seconds("900"), Some(900));
        assert_eq!(parse_seconds("-1"), Some(-1));
        assert_eq!(parse_seconds("15m"), Some(900));
        assert_eq!(parse_seconds("2h"), Some(7200));
        assert_eq!(parse_seconds("soon"), None);
    }

    #[test]
    fn format_seconds_round_trips_through_parse() {
        assert_eq!(parse_seconds(&format_seconds(5400)), Some(5400));
        assert_eq!(format_seconds(0), "0");
    }

    #[test]
    fn env_var_name_uses_prefix_and_snake_case() {
        assert_eq!(env_var_name("assets-path"), "LUMINA_ASSETS_PATH");
        assert_eq!(env_var_name("debug"), "LUMINA_DEBUG");
    }

    #[test]
    fn absolute_from_joins_relative_paths_onto_base() {
        let base = Path::new("/srv/lumina");
        assert_eq!(
            absolute_from(Path::new("cache"), Some(base)),
            PathBuf::from("/srv/lumina/cache")
        );
        assert_eq!(
            absolute_from(Path::new("/tmp/x"), Some(base)),
            PathBuf::from("/tmp/x")
        );
        assert!(absolute_from(Path::new("rel"), None).is_absolute());
    }
}
