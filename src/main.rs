//! Prodex binary entry point: argument parsing and command dispatch.

use clap::{Args, CommandFactory, Parser, Subcommand};
use prodex::cli;
use prodex::extraction::SelectorSet;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "prodex",
    version,
    about = "Structured product extraction for ecommerce workflows",
    long_about = "Extract product records (title, price, images, specs) from pages via CSS \
                  selectors and forward them to workflow webhooks.\n\nRun without a subcommand \
                  to enter the interactive panel."
)]
struct Cli {
    /// Output machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Per-invocation selector overrides, applied on top of persisted defaults.
#[derive(Args)]
struct SelectorOverrides {
    /// Title selector override
    #[arg(long)]
    title: Option<String>,

    /// Price selector override
    #[arg(long)]
    price: Option<String>,

    /// Images selector override
    #[arg(long)]
    images: Option<String>,

    /// Specs selector override
    #[arg(long)]
    specs: Option<String>,
}

impl SelectorOverrides {
    fn to_selector_set(&self) -> SelectorSet {
        SelectorSet {
            title: self.title.clone().unwrap_or_default(),
            price: self.price.clone().unwrap_or_default(),
            images: self.images.clone().unwrap_or_default(),
            specs: self.specs.clone().unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a product page and print the extracted record
    Parse {
        /// Page URL or local HTML file
        target: String,

        #[command(flatten)]
        overrides: SelectorOverrides,

        /// Also show per-field selector outcomes
        #[arg(long)]
        report: bool,
    },

    /// Show which elements a selector matches on a page
    Preview {
        /// Page URL or local HTML file
        target: String,

        /// CSS selector to preview
        selector: String,
    },

    /// Parse a page and forward the record to the workflow webhook
    Send {
        /// Page URL or local HTML file
        target: String,

        #[command(flatten)]
        overrides: SelectorOverrides,
    },

    /// Parse a page and fill missing specs via the AI endpoint
    Complete {
        /// Page URL or local HTML file
        target: String,

        #[command(flatten)]
        overrides: SelectorOverrides,

        /// Forward the merged record to the workflow webhook afterwards
        #[arg(long)]
        send: bool,
    },

    /// Start a feed-wide price update workflow
    Update {
        /// Product feed URL handed to the workflow
        feed_url: String,
    },

    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Show recent operations from the history log
    History {
        /// Number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Enter the interactive panel (also the default with no subcommand)
    Panel,

    /// Check environment, settings, and endpoint reachability
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show all settings
    Show,
    /// Set one key
    Set { key: String, value: String },
    /// Reset everything to defaults
    Reset,
    /// Print the settings file path
    Path,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Surface global flags to the output helpers via env
    if cli.json {
        std::env::set_var("PRODEX_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("PRODEX_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("PRODEX_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("PRODEX_NO_COLOR", "1");
    }

    let default_filter = if cli.verbose { "prodex=debug" } else { "prodex=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        None | Some(Commands::Panel) => cli::panel::run().await,
        Some(Commands::Parse {
            target,
            overrides,
            report,
        }) => cli::parse_cmd::run(target, &overrides.to_selector_set(), *report).await,
        Some(Commands::Preview { target, selector }) => {
            cli::preview_cmd::run(target, selector).await
        }
        Some(Commands::Send { target, overrides }) => {
            cli::send_cmd::run(target, &overrides.to_selector_set()).await
        }
        Some(Commands::Complete {
            target,
            overrides,
            send,
        }) => cli::complete_cmd::run(target, &overrides.to_selector_set(), *send).await,
        Some(Commands::Update { feed_url }) => cli::update_cmd::run(feed_url).await,
        Some(Commands::Settings { action }) => match action {
            None | Some(SettingsAction::Show) => cli::settings_cmd::run_show(),
            Some(SettingsAction::Set { key, value }) => cli::settings_cmd::run_set(key, value),
            Some(SettingsAction::Reset) => cli::settings_cmd::run_reset(),
            Some(SettingsAction::Path) => cli::settings_cmd::run_path(),
        },
        Some(Commands::History { limit }) => cli::history_cmd::run(*limit),
        Some(Commands::Doctor) => cli::doctor::run().await,
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(*shell, &mut Cli::command(), "prodex", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        let s = cli::output::Styled::new();
        eprintln!("  {} {e:#}", s.fail_sym());
        std::process::exit(1);
    }
}
