use std::collections::HashMap;

use super::FlagContext;

/// In-memory flag context for tests and embedders that assemble options
/// programmatically.
///
/// Values added with [`StaticFlags::set`] count as explicitly passed;
/// values added with [`StaticFlags::default_value`] are visible through
/// `value` but do not override lower layers, matching a CLI flag that was
/// declared with a default and left alone.
#[derive(Debug, Clone, Default)]
pub struct StaticFlags {
    explicit: HashMap<String, String>,
    defaults: HashMap<String, String>,
}

impl StaticFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.explicit.insert(name.into(), value.into());
        self
    }

    pub fn default_value(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }
}

impl FlagContext for StaticFlags {
    fn value(&self, name: &str) -> Option<String> {
        self.explicit
            .get(name)
            .or_else(|| self.defaults.get(name))
            .cloned()
    }

    fn is_set(&self, name: &str) -> bool {
        self.explicit.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_visible_but_not_set() {
        let flags = StaticFlags::new()
            .set("assets-path", "/srv/assets")
            .default_value("http-port", "2342");

        assert!(flags.is_set("assets-path"));
        assert!(!flags.is_set("http-port"));
        assert_eq!(flags.value("http-port").as_deref(), Some("2342"));
        assert_eq!(flags.value("debug"), None);
    }
}
