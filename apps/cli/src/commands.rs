//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use docnav_core::{
    FileThemeStore, HydrationReport, MemoryClipboard, NavOutcome, NoLayout, Services, Session,
    SyntectHighlighter, Viewport,
};
use docnav_fetch::HttpFetcher;
use docnav_shared::{
    ApiCard, ApiRow, AppConfig, HeadingLevel, TocEntry, init_config, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docnav: soft navigation for documentation sites, without a browser.
#[derive(Parser)]
#[command(
    name = "docnav",
    version,
    about = "Load documentation pages headlessly and soft-navigate between them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.docnav/docnav.toml.
    #[arg(long, global = true, env = "DOCNAV_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load a page and print its outline and API cards.
    Outline {
        /// Page URL.
        url: String,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Load a page, then soft-navigate through one or more paths.
    Browse {
        /// Starting page URL.
        url: String,

        /// Path or URL to visit, resolved against the current page. Repeatable.
        #[arg(long = "visit", required = true)]
        visits: Vec<String>,

        /// Go back one history entry after the last visit.
        #[arg(long)]
        back: bool,

        /// Viewport width in CSS pixels.
        #[arg(long, default_value = "1280")]
        width: u32,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docnav=info",
        1 => "docnav=debug",
        _ => "docnav=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Outline { url, json } => {
            let config = resolve_config(cli.config.as_deref())?;
            cmd_outline(config, &url, json).await
        }
        Command::Browse {
            url,
            visits,
            back,
            width,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            cmd_browse(config, &url, &visits, back, width).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()).await,
        },
    }
}

fn resolve_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| eyre!("invalid URL '{raw}': {e}"))
}

fn services(config: &AppConfig, width: u32) -> Result<Services> {
    Ok(Services {
        clipboard: Arc::new(MemoryClipboard::new()),
        themes: Arc::new(FileThemeStore::in_config_dir()?),
        highlighter: config
            .hydration
            .highlight
            .then(|| Arc::new(SyntectHighlighter::new()) as Arc<dyn docnav_core::Highlighter>),
        geometry: Arc::new(NoLayout),
        viewport: Viewport::new(width, Viewport::default().height),
    })
}

fn spinner(message: String) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message);
    Ok(spinner)
}

async fn open_session(
    config: AppConfig,
    url: Url,
    width: u32,
) -> Result<Session<HttpFetcher>> {
    let fetcher = HttpFetcher::new(&config.navigation)?;
    let services = services(&config, width)?;

    let progress = spinner(format!("Loading {url}"))?;
    let session = Session::open(fetcher, config, services, url.clone()).await;
    progress.finish_and_clear();

    session.wrap_err_with(|| format!("failed to load {url}"))
}

// ---------------------------------------------------------------------------
// outline
// ---------------------------------------------------------------------------

async fn cmd_outline(config: AppConfig, url: &str, json: bool) -> Result<()> {
    let url = parse_url(url)?;
    let session = open_session(config, url, Viewport::default().width).await?;
    let page = session.page();
    let report = page.last_report();

    if json {
        let value = serde_json::json!({
            "url": page.location().as_str(),
            "title": page.title(),
            "outline": report.outline,
            "api_cards": report.api_cards,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("  {}", page.title());
    println!("  {}", page.location());
    println!();
    print_outline(&report.outline);
    print_api_cards(&report.api_cards);
    Ok(())
}

fn print_outline(outline: &[TocEntry]) {
    if outline.is_empty() {
        println!("  (no outline)");
        return;
    }
    println!("  Outline:");
    for entry in outline {
        let indent = match entry.level {
            HeadingLevel::H2 => "    ",
            HeadingLevel::H3 => "      ",
        };
        println!("{indent}{}  #{}", entry.label, entry.id);
    }
}

fn print_api_cards(cards: &[ApiCard]) {
    if cards.is_empty() {
        return;
    }
    println!();
    println!("  API cards:");
    for card in cards {
        println!("    {} (#{})", card.title, card.anchor);
        if let Some(signature) = &card.signature {
            println!("      func {signature}");
        }
        for row in &card.rows {
            match row {
                ApiRow::Property { label, value_html } => println!("      {label}: {value_html}"),
                ApiRow::FullWidth { value_html } => println!("      {value_html}"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// browse
// ---------------------------------------------------------------------------

async fn cmd_browse(
    config: AppConfig,
    url: &str,
    visits: &[String],
    back: bool,
    width: u32,
) -> Result<()> {
    let url = parse_url(url)?;
    let mut session = open_session(config, url, width).await?;
    let mut events = session.subscribe();
    print_step("open", &session.page().location(), &session.page().last_report());

    for href in visits {
        info!(href, "visiting");
        let progress = spinner(format!("Navigating to {href}"))?;
        let outcome = session.visit(href).await;
        progress.finish_and_clear();
        report_outcome(&mut session, &outcome?).await?;
    }

    if back {
        let progress = spinner("Going back".to_string())?;
        let outcome = session.back().await;
        progress.finish_and_clear();
        match outcome {
            Some(outcome) => report_outcome(&mut session, &outcome).await?,
            None => println!("  back: no earlier history entry"),
        }
    }

    let mut updates = 0;
    while events.try_recv().is_ok() {
        updates += 1;
    }
    let history = session.page().history();
    println!();
    println!("  Page events:     {updates}");
    println!("  History:         {} entries", history.len());
    println!("  Location:        {}", session.page().location());
    println!();
    Ok(())
}

async fn report_outcome(session: &mut Session<HttpFetcher>, outcome: &NavOutcome) -> Result<()> {
    match outcome {
        NavOutcome::Swapped { url, report } => print_step("swap", url, report),
        NavOutcome::Duplicate => println!("  skip: already loading"),
        NavOutcome::Cancelled => println!("  skip: superseded"),
        NavOutcome::HardNavigation { url, reason } => {
            println!("  full load: {url} ({reason})");
            let progress = spinner(format!("Loading {url}"))?;
            let followed = session.follow_hard_navigation().await;
            progress.finish_and_clear();
            if followed.wrap_err_with(|| format!("full load of {url} failed"))?.is_some() {
                print_step("load", url, &session.page().last_report());
            }
        }
    }
    Ok(())
}

fn print_step(kind: &str, url: &Url, report: &HydrationReport) {
    println!(
        "  {kind:<5} {url}  ({} outline entries, {} api cards, {} code blocks)",
        report.outline.len(),
        report.api_cards.len(),
        report.code.copy_buttons,
    );
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&std::path::Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
