//! Command-line surface of the option table.
//!
//! The loader never talks to `clap` directly; it reads flags through
//! [`FlagContext`], which the real `ArgMatches` and the [`StaticFlags`]
//! fixture both implement.

pub mod fixture;

use clap::{Arg, ArgAction, ArgMatches, Command, parser::ValueSource};

use crate::models::keys::{OPTION_KEYS, OptionKind};

pub use fixture::StaticFlags;

/// Read access to parsed command-line flags.
///
/// `value` may return a declared default even when the user did not pass
/// the flag; `is_set` reports whether the flag was given explicitly. Only
/// explicit flags take part in precedence.
pub trait FlagContext {
    fn value(&self, name: &str) -> Option<String>;
    fn is_set(&self, name: &str) -> bool;
}

impl FlagContext for ArgMatches {
    fn value(&self, name: &str) -> Option<String> {
        let mut raw = self.try_get_raw(name).ok().flatten()?;
        raw.next().map(|value| value.to_string_lossy().into_owned())
    }

    fn is_set(&self, name: &str) -> bool {
        if self.try_get_raw(name).is_err() {
            return false;
        }
        matches!(self.value_source(name), Some(ValueSource::CommandLine))
    }
}

/// One long flag per option key. Boolean keys work as switches and also
/// accept an explicit value (`--detect-nsfw=false`).
pub fn option_args() -> Vec<Arg> {
    OPTION_KEYS
        .iter()
        .map(|key| {
            let arg = Arg::new(key.name)
                .long(key.name)
                .help(key.help)
                .global(true);

            match key.kind {
                OptionKind::Bool => arg
                    .action(ArgAction::Set)
                    .num_args(0..=1)
                    .require_equals(true)
                    .default_missing_value("true")
                    .value_name("BOOL"),
                OptionKind::Path => {
                    arg.action(ArgAction::Set).value_name("PATH")
                }
                OptionKind::Int => arg
                    .action(ArgAction::Set)
                    .allow_negative_numbers(true)
                    .value_name("N"),
                OptionKind::Seconds => arg
                    .action(ArgAction::Set)
                    .allow_negative_numbers(true)
                    .value_name("DURATION"),
                OptionKind::Text => {
                    arg.action(ArgAction::Set).value_name("VALUE")
                }
            }
        })
        .collect()
}

/// Base command carrying every option flag plus `--env-file`.
pub fn command(name: &'static str) -> Command {
    Command::new(name)
        .arg(
            Arg::new("env-file")
                .long("env-file")
                .help("dotenv file loaded before reading LUMINA_* variables")
                .value_name("PATH")
                .global(true),
        )
        .args(option_args())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        command("lumina-test")
            .try_get_matches_from(
                std::iter::once("lumina-test").chain(args.iter().copied()),
            )
            .expect("arguments parse")
    }

    #[test]
    fn command_definition_is_consistent() {
        command("lumina-test").debug_assert();
    }

    #[test]
    fn explicit_flags_are_set_and_others_are_not() {
        let matches = parse(&["--http-port", "8080", "--debug"]);
        let matches: &dyn FlagContext = &matches;
        assert!(matches.is_set("http-port"));
        assert_eq!(matches.value("http-port").as_deref(), Some("8080"));
        assert!(matches.is_set("debug"));
        assert_eq!(matches.value("debug").as_deref(), Some("true"));
        assert!(!matches.is_set("read-only"));
        assert_eq!(matches.value("read-only"), None);
    }

    #[test]
    fn boolean_flags_accept_explicit_values() {
        let matches = parse(&["--detect-nsfw=false"]);
        let matches: &dyn FlagContext = &matches;
        assert!(matches.is_set("detect-nsfw"));
        assert_eq!(matches.value("detect-nsfw").as_deref(), Some("false"));
    }

    #[test]
    fn negative_numbers_are_values_not_flags() {
        let matches =
            parse(&["--auto-import", "-1", "--originals-limit", "-1"]);
        let matches: &dyn FlagContext = &matches;
        assert!(matches.is_set("auto-import"));
        assert_eq!(matches.value("auto-import").as_deref(), Some("-1"));
        assert!(matches.is_set("originals-limit"));
        assert_eq!(matches.value("originals-limit").as_deref(), Some("-1"));
    }

    #[test]
    fn unknown_names_are_never_set() {
        let matches = parse(&[]);
        let matches: &dyn FlagContext = &matches;
        assert!(!matches.is_set("no-such-flag"));
        assert_eq!(matches.value("no-such-flag"), None);
    }
}
