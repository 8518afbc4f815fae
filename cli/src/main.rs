use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use webalias_core::{AliasDefinition, CliOverride};
use webalias_db::{AliasStore, Settings};
use webalias_resolver::{Dispatcher, Launch, Request, Resolution, Resolver, SystemLauncher};

const LOG_ENV: &str = "WEBALIAS_LOG";

/// Output format for `--list` and `--dry-run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "webalias", version)]
#[command(about = "Open aliased URLs, direct URLs or web searches in a browser or pager")]
struct Cli {
    /// Alias names followed by search terms, or URLs to open directly.
    #[arg(required_unless_present = "list", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Open with GUI handler N (gui1..gui9).
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=9))]
    browser: Option<u8>,

    /// Open with terminal handler N (term1..term7).
    #[arg(
        short,
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u8).range(1..=7),
        conflicts_with = "browser"
    )]
    term: Option<u8>,

    /// Dump pages as text into a pager, optionally skipping N pages.
    #[arg(
        short,
        long,
        value_name = "N",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "0"
    )]
    dump: Option<u32>,

    /// Treat every leading argument that names an alias as an alias.
    #[arg(short, long)]
    multi: bool,

    /// Copy the URLs to the clipboard instead of opening them.
    #[arg(short, long)]
    clipboard: bool,

    /// List the loaded aliases and exit.
    #[arg(short, long)]
    list: bool,

    /// Search the arguments when no alias matches.
    #[arg(short = 's', long)]
    search: bool,

    /// Report unknown aliases instead of searching.
    #[arg(short = 'S', long, conflicts_with = "search")]
    no_search: bool,

    /// Print what would be opened without launching anything.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Settings file (default: <config dir>/webalias/config.yml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format for --list and --dry-run.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

impl Cli {
    fn cli_override(&self) -> CliOverride {
        let handler = match (self.browser, self.term) {
            (Some(n), _) => Some(format!("gui{n}")),
            (None, Some(n)) => Some(format!("term{n}")),
            (None, None) => None,
        };
        CliOverride {
            handler,
            dump: self.dump,
        }
    }

    fn search_override(&self) -> Option<bool> {
        match (self.search, self.no_search) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Dry-run report: the resolution plus the launcher calls it would make.
#[derive(Debug, Serialize)]
struct DryRun<'a> {
    #[serde(flatten)]
    resolution: &'a Resolution,
    launches: Vec<Launch>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let (settings, settings_path) = load_settings(cli.config.clone())?;
    let store = settings
        .store_builder(&settings_path)
        .build()
        .map_err(|e| e.to_string())?;
    tracing::debug!(
        aliases = store.len(),
        config = %settings_path.display(),
        "loaded aliases"
    );

    if cli.list {
        return print_aliases(&store, cli.format);
    }

    let launcher = SystemLauncher::from_settings(&settings);
    let resolver = Resolver::new(&store, &settings, &launcher).map_err(|e| e.to_string())?;
    let request = Request::new(cli.args.iter().cloned())
        .multi_alias(cli.multi)
        .clipboard(cli.clipboard)
        .cli(cli.cli_override())
        .search(cli.search_override());
    let resolution = resolver.resolve(&request).map_err(|e| e.to_string())?;

    let dispatcher = Dispatcher::new(&settings);
    if cli.dry_run {
        return print_dry_run(&dispatcher, &resolution, cli.format);
    }

    match &resolution {
        Resolution::Dispatch { actions, .. } => dispatcher
            .dispatch(actions, &launcher)
            .map_err(|e| e.to_string()),
        Resolution::Clipboard { urls, .. } => {
            dispatcher.copy(urls, &launcher).map_err(|e| e.to_string())
        }
        Resolution::NotFound { name } => {
            eprintln!("alias not found: {name}");
            Ok(())
        }
    }
}

/// Loads the settings file given with `--config`, or the default one if it
/// exists.
fn load_settings(explicit: Option<PathBuf>) -> Result<(Settings, PathBuf), String> {
    match explicit {
        Some(path) => {
            let settings = Settings::load(&path)
                .map_err(|e| format!("failed to load '{}': {e}", path.display()))?;
            Ok((settings, path))
        }
        None => {
            let path = Settings::default_path()
                .ok_or_else(|| "cannot determine the configuration directory".to_string())?;
            let settings = Settings::load_or_default(&path)
                .map_err(|e| format!("failed to load '{}': {e}", path.display()))?;
            Ok((settings, path))
        }
    }
}

fn print_aliases(store: &AliasStore, format: CliOutputFormat) -> Result<(), String> {
    let aliases: Vec<&AliasDefinition> = store.iter().collect();
    match format {
        CliOutputFormat::Json => print_serialized_json(&aliases),
        CliOutputFormat::Yaml => print_serialized_yaml(&aliases),
        CliOutputFormat::Table => {
            let name_width = store.names().map(str::len).max().unwrap_or(0);
            let option_width = aliases
                .iter()
                .map(|a| a.options.to_string().len())
                .max()
                .unwrap_or(0);
            for alias in aliases {
                let alias_options = alias.options.to_string();
                for (i, entry) in alias.url_entries.iter().enumerate() {
                    let (name, options) = if i == 0 {
                        (alias.name.as_str(), alias_options.as_str())
                    } else {
                        ("", "")
                    };
                    let entry_options = if entry.options.is_empty() {
                        String::new()
                    } else {
                        format!("  [{}]", entry.options)
                    };
                    let line = format!(
                        "{name:<name_width$}  {options:<option_width$}  {}{entry_options}",
                        entry.template
                    );
                    println!("{}", line.trim_end());
                }
            }
            Ok(())
        }
    }
}

fn print_dry_run(
    dispatcher: &Dispatcher<'_>,
    resolution: &Resolution,
    format: CliOutputFormat,
) -> Result<(), String> {
    let mut launches = Vec::new();
    if let Resolution::Dispatch { actions, .. } = resolution {
        for action in actions {
            launches.extend(dispatcher.plan(action).map_err(|e| e.to_string())?);
        }
    }
    let report = DryRun {
        resolution,
        launches,
    };

    match format {
        CliOutputFormat::Json => print_serialized_json(&report),
        CliOutputFormat::Yaml => print_serialized_yaml(&report),
        CliOutputFormat::Table => {
            match resolution {
                Resolution::Dispatch { mode, .. } => {
                    println!("mode: {}", mode.as_str());
                }
                Resolution::Clipboard { urls, .. } => {
                    println!("clipboard:");
                    for url in urls {
                        println!("  {url}");
                    }
                }
                Resolution::NotFound { name } => println!("alias not found: {name}"),
            }
            for launch in &report.launches {
                match launch {
                    Launch::Gui { command, urls } => {
                        println!("gui       {command} {}", urls.join(" "))
                    }
                    Launch::Terminal { title, command } => {
                        println!("terminal  [{title}] {command}")
                    }
                }
            }
            Ok(())
        }
    }
}

fn print_serialized_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn print_serialized_yaml<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let yaml = serde_yaml::to_string(value).map_err(|e| e.to_string())?;
    print!("{yaml}");
    Ok(())
}
