use std::path::Path;

use anyhow::{Context, Result};
use clap::Command;
use lumina_config::{
    AppInfo, Config, cli, loader::validate_options_file, util::format_seconds,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn command() -> Command {
    cli::command("lumina-config")
        .about("Inspect the resolved Lumina configuration")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("paths").about("Print every derived path"))
        .subcommand(
            Command::new("client")
                .about("Print the client config as sent to the web UI"),
        )
        .subcommand(
            Command::new("options")
                .about("Print effective options with secrets redacted"),
        )
        .subcommand(
            Command::new("check")
                .about("Resolve options, create directories and report"),
        )
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = command().get_matches();
    let config = Config::load(AppInfo::default(), &matches)
        .context("failed to resolve configuration")?;

    let result = match matches.subcommand() {
        Some(("paths", _)) => print_paths(&config),
        Some(("client", _)) => print_client(&config),
        Some(("options", _)) => print_options(&config),
        Some(("check", _)) => check(&config),
        _ => Ok(()),
    };

    config.close().context("failed to close storage")?;
    result
}

fn print_paths(config: &Config) -> Result<()> {
    let entries = config.path_entries();
    let width = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, path) in entries {
        println!("{name:<width$}  {}", path.display());
    }
    Ok(())
}

fn print_client(config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(&config.user_config())
        .context("failed to serialize client config")?;
    println!("{json}");
    Ok(())
}

fn print_options(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(&config.options().redacted())
        .context("failed to serialize options")?;
    print!("{yaml}");
    Ok(())
}

fn check(config: &Config) -> Result<()> {
    let options_file = config.config_file();
    if options_file.exists() {
        validate_options_file(&options_file)?;
        println!("options file   {} (ok)", options_file.display());
    } else {
        println!("options file   {} (not present)", options_file.display());
    }

    config
        .create_directories()
        .context("failed to create storage directories")?;
    println!("storage        {} (ok)", config.storage_path().display());

    for (label, bin) in [
        ("exiftool", config.exiftool_bin()),
        ("darktable", config.darktable_bin()),
        ("ffmpeg", config.ffmpeg_bin()),
    ] {
        let status = if Path::new(&bin).is_absolute() {
            "found"
        } else {
            "missing"
        };
        println!("{label:<14} {bin} ({status})");
    }

    println!("database       {}", config.database_driver());
    println!("workers        {}", config.workers());
    println!(
        "wakeup         {}",
        format_seconds(config.wakeup_interval().as_secs() as i64)
    );
    println!("serial         {}", config.serial());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn global_options_work_after_the_subcommand() {
        let matches = command()
            .try_get_matches_from([
                "lumina-config",
                "paths",
                "--storage-path",
                "/srv/storage",
            ])
            .unwrap();
        let flags: &dyn cli::FlagContext = &matches;
        assert!(flags.is_set("storage-path"));
        assert_eq!(
            flags.value("storage-path").as_deref(),
            Some("/srv/storage")
        );
    }
}
