use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use magic_showtimes::cli::{doctor, extract_cmd, output, scrape_cmd};
use magic_showtimes::config::ScrapeConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Capture the Cinéma Magic showtimes into a JSON file.
#[derive(Parser, Debug)]
#[command(name = "magic-showtimes", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// JSON config file; missing keys keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only print errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Debug-level logging
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the live page and write the result (default)
    Scrape(ScrapeArgs),
    /// Extract from a saved HTML page
    Extract {
        /// Rendered HTML of the showtimes page
        html_file: PathBuf,
        /// Write the result here instead of printing it
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Page URL the snapshot was taken from, used to resolve links
        #[arg(long)]
        url: Option<String>,
    },
    /// Check that a capture can run on this machine
    Doctor,
}

#[derive(Args, Debug, Default)]
struct ScrapeArgs {
    /// Result file
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Chromium binary
    #[arg(long)]
    chromium: Option<PathBuf>,
    /// Directory receiving page.html and screenshot.png on failure
    #[arg(long)]
    debug_dir: Option<PathBuf>,
    /// Page load timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl ScrapeArgs {
    fn apply(self, config: &mut ScrapeConfig) {
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(chromium) = self.chromium {
            config.browser.executable = Some(chromium);
        }
        if let Some(dir) = self.debug_dir {
            config.debug_dir = Some(dir);
        }
        if let Some(secs) = self.timeout {
            config.browser.navigation_timeout_ms = secs.saturating_mul(1_000);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.quiet {
        std::env::set_var(output::ENV_QUIET, "1");
    }
    if cli.no_color {
        std::env::set_var(output::ENV_NO_COLOR, "1");
    }
    init_tracing(&cli)?;

    let mut config = ScrapeConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    let code = match cli.command.unwrap_or(Command::Scrape(ScrapeArgs::default())) {
        Command::Scrape(args) => {
            args.apply(&mut config);
            config.validate()?;
            scrape_cmd::run(config).await?
        }
        Command::Extract {
            html_file,
            output,
            url,
        } => {
            if let Some(url) = url {
                config.cinema.url = url;
            }
            let write = output.is_some();
            if let Some(output) = output {
                config.output = output;
            }
            config.validate()?;
            extract_cmd::run(config, &html_file, write).await?
        }
        Command::Doctor => doctor::run(&config).await?,
    };

    std::process::exit(code);
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::from_default_env().add_directive(format!("magic_showtimes={level}").parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder
            .with_ansi(output::color_enabled() && !cli.no_color)
            .init();
    }
    Ok(())
}
