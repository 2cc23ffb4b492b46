use anyhow::{Context, Result};
use crossterm::style::Stylize;
use peco_config::config::{Config, RcfileLocator};
use peco_config::logging::init_tracing;
use std::path::PathBuf;

fn print_help() {
    println!("{}", "peco-config".bold());
    println!("Locate, load and inspect the peco configuration file\n");
    println!("Usage: peco-config [OPTIONS]\n");
    println!("Options:");
    println!("  --locate            Print the path of the config file that would be used");
    println!("  --config <path>     Read this file instead of searching for one");
    println!("  --print-config      Print the resolved configuration as JSON (default)");
    println!("  --generate-config   Print the default configuration as a JSON template");
    println!("  --show-styles       Render a sample of every configured style");
    println!("  -h, --help          Show this help");
    println!("\nSearch order:");
    println!("  $XDG_CONFIG_HOME/peco/config.json (or ~/.config/peco/config.json)");
    println!("  <dir>/peco/config.json for each dir in $XDG_CONFIG_DIRS");
    println!("  ~/.peco/config.json");
}

/// Load from an explicit path, or search; a missing file means defaults
fn resolve_config(explicit: Option<PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let mut config = Config::default();
        config
            .read_filename(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        return Ok((config, Some(path)));
    }

    match Config::load() {
        Ok((config, path)) => Ok((config, Some(path))),
        Err(e) if e.is_not_found() => {
            tracing::warn!(target: "config", "{e}, using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => Err(e).context("Failed to load config"),
    }
}

fn show_styles(config: &Config) {
    for (name, style) in config.style.slots() {
        let sample = style.to_content_style().apply(format!(" {name:<16}"));
        println!(
            "{sample} fg={} bg={}  {}",
            style.fg,
            style.bg,
            style.tokens().join(" ")
        );
    }
}

fn main() -> Result<()> {
    init_tracing("warn");

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        println!("{}", Config::default().to_json_pretty()?);
        return Ok(());
    }

    if args.contains(&"--locate".to_string()) {
        let path = RcfileLocator::new().locate()?;
        println!("{}", path.display());
        return Ok(());
    }

    let explicit = match args.iter().position(|a| a == "--config") {
        Some(pos) => Some(
            args.get(pos + 1)
                .map(PathBuf::from)
                .context("--config requires a path")?,
        ),
        None => None,
    };

    let (config, path) = resolve_config(explicit)?;
    if let Some(path) = &path {
        tracing::debug!(target: "config", "Using {}", path.display());
    }

    if args.contains(&"--show-styles".to_string()) {
        show_styles(&config);
    } else {
        println!("{}", config.to_json_pretty()?);
    }

    Ok(())
}
