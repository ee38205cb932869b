mod sandbox;

use aihotkeys_actions::{AttemptResult, AttemptSource, DispatchOutcome, KeyEvent, Resolution};
use aihotkeys_core::logging::LoggingConfig;
use aihotkeys_core::{
    ActionId, Config, FileSettingsStore, KeymapParse, Rejection, ShortcutMap, WatchConfig, blocked_shortcuts,
    init_logging, parse_keymap, serialize_keymap, settings_record,
};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use sandbox::Sandbox;

/// AI Hotkeys - keyboard shortcuts for AI chat sites
#[derive(Parser, Debug)]
#[command(name = "aihotkeys")]
#[command(about = "Manage hotkey bindings and try them against saved chat pages", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to aihotkeys.toml (default: ./aihotkeys.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Settings file holding the shortcut record (overrides storage.path)
    #[arg(short, long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the effective bindings
    Keys,
    /// List combos the browser reserves
    Blocked,
    /// Validate a keymap file without saving it
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Validate a keymap file and save it as the shortcut record
    Apply {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the effective bindings as keymap text
    Export,
    /// Restore the default bindings
    Reset,
    /// Run one action against a saved HTML page
    Resolve {
        /// Saved page
        #[arg(long, value_name = "FILE")]
        html: PathBuf,

        /// URL the page was served from; selects the site profile
        #[arg(long, value_name = "URL")]
        url: String,

        #[arg(value_name = "ACTION")]
        action: ActionId,
    },
    /// Press a key combo on a saved HTML page, e.g. `cmd+shift+o`
    Press {
        #[arg(long, value_name = "FILE")]
        html: PathBuf,

        #[arg(long, value_name = "URL")]
        url: String,

        #[arg(value_name = "COMBO")]
        combo: String,
    },
    /// Print the bindings every time the settings file changes
    Watch,
    /// Write an example aihotkeys.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from("aihotkeys.toml"));
    if let Commands::Init { force } = cli.command {
        return cmd_init(&config_path, force);
    }
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "aihotkeys", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&config_path)?;
    let _guard = init_logging(Some(LoggingConfig::from(config.logging.clone())))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let store = FileSettingsStore::new(cli.store.clone().unwrap_or_else(|| config.storage.path.clone()));
    if cli.verbose {
        println!("{} Using config: {}", "Info:".blue().bold(), config_path.display());
        println!("{} Settings file: {}", "Info:".blue().bold(), store.path().display());
    }

    match cli.command {
        Commands::Keys => cmd_keys(&store),
        Commands::Blocked => {
            print!("{}", render_blocked());
            Ok(())
        }
        Commands::Check { file } => cmd_check(&file).map(|_| ()),
        Commands::Apply { file } => cmd_apply(&file, &store),
        Commands::Export => cmd_export(&store),
        Commands::Reset => cmd_reset(&store),
        Commands::Resolve { html, url, action } => cmd_resolve(&config, &store, &html, &url, action),
        Commands::Press { html, url, combo } => cmd_press(&config, &store, &html, &url, &combo),
        Commands::Watch => cmd_watch(&store, &config.watch),
        Commands::Init { .. } | Commands::Completions { .. } => Ok(()),
    }
}

/// Load config from file, or defaults when it does not exist
fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path).map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e))
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, Config::example()).context("Failed to write config")?;
    println!("{} Created config at {}", "Success:".green().bold(), path.display());
    Ok(())
}

/// Build the effective map from the store, warning about anything that fell back
fn load_shortcuts(store: &FileSettingsStore) -> Result<(ShortcutMap, Vec<Rejection>)> {
    let record = store.load().context("Failed to read shortcut record")?;
    let report = ShortcutMap::build_report(record.as_ref());
    Ok((report.map, report.rejected))
}

fn print_warnings(map: &ShortcutMap, rejected: &[Rejection]) {
    for rejection in rejected {
        println!(
            "{} {}: {} (using default)",
            "Warning:".yellow().bold(),
            rejection.action.as_str().cyan(),
            rejection.reason
        );
    }
    for conflict in map.conflicts() {
        println!(
            "{} {} is bound to {} too; {} wins",
            "Warning:".yellow().bold(),
            conflict.shadowed.as_str().cyan(),
            conflict.shortcut,
            conflict.winner.as_str().cyan()
        );
    }
}

fn render_bindings(map: &ShortcutMap) -> String {
    let width = ActionId::ALL.iter().map(|id| id.as_str().len()).max().unwrap_or_default();
    map.iter()
        .map(|(id, shortcut)| {
            format!("{:<width$}  {:<12}  {}\n", id.as_str(), shortcut.to_string(), id.metadata().title, width = width)
        })
        .collect()
}

fn render_blocked() -> String {
    blocked_shortcuts()
        .map(|(key, shift, reason)| {
            let combo = match shift {
                true => format!("Cmd+Shift+{}", key.to_ascii_uppercase()),
                false => format!("Cmd+{}", key.to_ascii_uppercase()),
            };
            format!("{:<12}  {}\n", combo, reason)
        })
        .collect()
}

fn cmd_keys(store: &FileSettingsStore) -> Result<()> {
    let (map, rejected) = load_shortcuts(store)?;
    println!("{}", "Bindings".green().bold().underline());
    print!("{}", render_bindings(&map));
    print_warnings(&map, &rejected);
    Ok(())
}

fn print_keymap_errors(parsed: &KeymapParse) {
    for error in &parsed.errors {
        println!("{} {}", "Invalid:".red().bold(), error);
    }
}

/// Parse a keymap file; fails when any line is invalid
fn cmd_check(file: &Path) -> Result<KeymapParse> {
    let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let parsed = parse_keymap(&text);
    if !parsed.is_ok() {
        print_keymap_errors(&parsed);
        anyhow::bail!("{} has {} invalid line(s)", file.display(), parsed.errors.len());
    }

    let map = parsed.to_map();
    println!(
        "{} {} assignment(s) in {}",
        "Valid:".green().bold(),
        parsed.assignments.len(),
        file.display()
    );
    print_warnings(&map, &[]);
    Ok(parsed)
}

fn cmd_apply(file: &Path, store: &FileSettingsStore) -> Result<()> {
    let parsed = cmd_check(file)?;
    let map = parsed.to_map();
    store.save(&settings_record(&map)).context("Failed to save shortcut record")?;
    tracing::info!(path = %store.path().display(), "applied keymap");
    println!("{} Saved bindings to {}", "Success:".green().bold(), store.path().display());
    print!("{}", render_bindings(&map));
    Ok(())
}

fn cmd_export(store: &FileSettingsStore) -> Result<()> {
    let (map, rejected) = load_shortcuts(store)?;
    for rejection in &rejected {
        eprintln!("{} {}: {}", "Warning:".yellow().bold(), rejection.action, rejection.reason);
    }
    println!("{}", serialize_keymap(&map));
    Ok(())
}

fn cmd_reset(store: &FileSettingsStore) -> Result<()> {
    store
        .save(&settings_record(&ShortcutMap::defaults()))
        .context("Failed to save shortcut record")?;
    println!("{} Restored default bindings", "Success:".green().bold());
    Ok(())
}

fn open_sandbox(config: &Config, store: &FileSettingsStore, html: &Path, url: &str) -> Result<Sandbox> {
    let record = store.load().context("Failed to read shortcut record")?;
    let privacy = LoggingConfig::from(config.logging.clone()).privacy;
    let (sandbox, rejected) = Sandbox::load(html, url, record.as_ref(), privacy)?;
    print_warnings(sandbox.controller().shortcuts(), &rejected);

    let profile = sandbox.profile_name().unwrap_or("generic only");
    println!("{} Site profile: {}", "Info:".blue().bold(), profile.cyan());
    Ok(sandbox)
}

fn render_resolution(resolution: &Resolution) -> String {
    resolution
        .outcomes
        .iter()
        .map(|outcome| {
            let source = match outcome.source {
                AttemptSource::Profile => "profile",
                AttemptSource::Generic => "generic",
            };
            let result = match &outcome.result {
                AttemptResult::Succeeded => "ok".to_string(),
                AttemptResult::Failed => "no match".to_string(),
                AttemptResult::Errored(err) => format!("error: {}", err),
            };
            format!("{:<8} {:<40} {}\n", source, outcome.label, result)
        })
        .collect()
}

fn print_effects(sandbox: &Sandbox) {
    for effect in sandbox.effects() {
        println!("  {} {}", "->".blue(), effect);
    }
    if let Some(contents) = sandbox.clipboard_contents() {
        println!("{}", "Clipboard".green().bold().underline());
        println!("{}", contents);
    }
}

fn cmd_resolve(config: &Config, store: &FileSettingsStore, html: &Path, url: &str, action: ActionId) -> Result<()> {
    let sandbox = open_sandbox(config, store, html, url)?;
    let resolution = sandbox.resolve(action);

    print!("{}", render_resolution(&resolution));
    print_effects(&sandbox);
    match resolution.handled() {
        true => println!("{} {} handled", "Success:".green().bold(), action.as_str().cyan()),
        false => println!("{} no handler matched {}", "Info:".yellow().bold(), action.as_str().cyan()),
    }
    Ok(())
}

fn cmd_press(config: &Config, store: &FileSettingsStore, html: &Path, url: &str, combo: &str) -> Result<()> {
    let event = KeyEvent::from_combo(combo).with_context(|| format!("Invalid key combo '{}'", combo))?;
    let sandbox = open_sandbox(config, store, html, url)?;

    match sandbox.press(&event) {
        DispatchOutcome::Ignored => println!("{} {} is not a hotkey; the page receives it", "Info:".blue().bold(), combo),
        DispatchOutcome::Handled { action, resolved } => {
            print_effects(&sandbox);
            let status = if resolved { "handled" } else { "consumed, no handler matched" };
            println!("{} {} -> {} ({})", "Success:".green().bold(), combo, action.as_str().cyan(), status);
        }
    }
    Ok(())
}

/// Last shortcut record printed by `watch`, so notifications and poll ticks only report real changes
#[derive(Debug, Default)]
struct RecordTracker {
    last: Option<Value>,
}

impl RecordTracker {
    fn new(initial: Option<Value>) -> Self {
        Self { last: initial }
    }

    /// True if `record` differs from the last one observed
    fn observe(&mut self, record: Option<Value>) -> bool {
        if record == self.last {
            return false;
        }
        self.last = record;
        true
    }
}

fn print_changed(record: Option<&Value>) {
    let report = ShortcutMap::build_report(record);
    println!("{}", "Bindings changed".green().bold().underline());
    print!("{}", render_bindings(&report.map));
    print_warnings(&report.map, &report.rejected);
}

/// Print bindings on every change; file events are backed up by a poll at `watch.poll_interval_ms`
fn cmd_watch(store: &FileSettingsStore, config: &WatchConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(async {
        let mut changes = store.subscribe();
        let _watcher = store.watch().context("Failed to watch settings file")?;
        let mut tracker = RecordTracker::new(store.load().context("Failed to read shortcut record")?);
        let mut ticker = tokio::time::interval(config.poll_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        println!(
            "{} Watching {} (polling every {} ms, Ctrl+C to stop)",
            "Info:".blue().bold(),
            store.path().display(),
            config.poll_interval_ms
        );

        loop {
            tokio::select! {
                change = changes.recv() => match change {
                    Ok(change) => {
                        if tracker.observe(change.new_value) {
                            print_changed(tracker.last.as_ref());
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "missed settings notifications");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                },
                _ = ticker.tick() => match store.load() {
                    Ok(record) => {
                        if tracker.observe(record) {
                            print_changed(tracker.last.as_ref());
                        }
                    }
                    Err(err) => tracing::warn!(%err, "failed to poll shortcut record"),
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}
