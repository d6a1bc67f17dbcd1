//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use policydiff_core::completion::OpenAiClient;
use policydiff_core::pipeline::{self, ComparisonOutcome, ProgressReporter};
use policydiff_shared::{AppConfig, CompareConfig, config_dir, init_config, load_config, resolve_api_key};
use policydiff_storage::{Storage, auth};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// PolicyDiff — keep client policy documents aligned with a master.
#[derive(Parser)]
#[command(
    name = "policydiff",
    version,
    about = "Compare client policy documents against a master and write annotated copies.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

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
    /// Compare client documents against a master and write patched copies.
    Compare {
        /// Path to the master policy document (.docx).
        #[arg(short, long)]
        master: PathBuf,

        /// Client policy documents to compare (.docx).
        #[arg(required = true)]
        clients: Vec<PathBuf>,

        /// Output directory for patched copies (defaults to config value).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Word budget per comparison chunk (defaults to config value).
        #[arg(long)]
        max_words: Option<usize>,

        /// Model to use for comparison prompts (defaults to config value).
        #[arg(long)]
        model: Option<String>,

        /// Username for the login gate (optional; gate is skipped if absent).
        #[arg(long)]
        user: Option<String>,

        /// Password for the login gate.
        #[arg(long, env = "POLICYDIFF_PASSWORD")]
        password: Option<String>,

        /// Print per-client results as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Create an account for the login gate.
    Signup {
        /// Username to register.
        #[arg(long)]
        user: String,

        /// Password to register.
        #[arg(long, env = "POLICYDIFF_PASSWORD")]
        password: String,
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
        0 => "policydiff=info",
        1 => "policydiff=debug",
        _ => "policydiff=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
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
        Command::Compare {
            master,
            clients,
            out,
            max_words,
            model,
            user,
            password,
            json,
        } => {
            cmd_compare(
                &master,
                &clients,
                out.as_deref(),
                max_words,
                model.as_deref(),
                user.as_deref(),
                password.as_deref(),
                json,
            )
            .await
        }
        Command::Signup { user, password } => cmd_signup(&user, &password).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// compare
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
async fn cmd_compare(
    master: &Path,
    clients: &[PathBuf],
    out: Option<&Path>,
    max_words: Option<usize>,
    model: Option<&str>,
    user: Option<&str>,
    password: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = load_config()?;

    // Validate API key before doing anything
    let api_key = resolve_api_key(&config)?;

    // The login gate runs before any document is read.
    if let Some(username) = user {
        let password =
            password.ok_or_else(|| eyre!("--password (or POLICYDIFF_PASSWORD) is required with --user"))?;
        let storage = open_user_storage().await?;
        if !auth::authenticate(&storage, username, password).await? {
            return Err(eyre!("invalid credentials for '{username}'"));
        }
        info!(username, "authenticated");
    }

    let mut compare_config = CompareConfig::from(&config);
    if let Some(words) = max_words {
        compare_config.max_chunk_words = words;
    }

    let completion = OpenAiClient::new(
        api_key,
        model.unwrap_or(&config.openai.model).to_string(),
        config.openai.temperature,
    );

    let out_dir = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.defaults.out_dir));
    std::fs::create_dir_all(&out_dir)?;

    let master_bytes = std::fs::read(master)
        .map_err(|e| eyre!("cannot read master document '{}': {e}", master.display()))?;

    info!(
        master = %master.display(),
        clients = clients.len(),
        max_words = compare_config.max_chunk_words,
        "starting comparison run"
    );

    for client_path in clients {
        let client_bytes = std::fs::read(client_path)
            .map_err(|e| eyre!("cannot read client document '{}': {e}", client_path.display()))?;

        let reporter = CliProgress::new();
        let outcome = pipeline::compare_and_patch(
            &master_bytes,
            &client_bytes,
            &completion,
            &compare_config,
            &reporter,
        )
        .await?;

        let patched_path = patched_output_path(&out_dir, client_path);
        std::fs::write(&patched_path, &outcome.patched_bytes)?;

        if json {
            print_json(client_path, &patched_path, &outcome)?;
        } else {
            print_text(client_path, &patched_path, &outcome);
        }
    }

    Ok(())
}

/// `<out_dir>/updated_<original file name>`.
fn patched_output_path(out_dir: &Path, client_path: &Path) -> PathBuf {
    let name = client_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "client.docx".to_string());
    out_dir.join(format!("updated_{name}"))
}

fn print_text(client_path: &Path, patched_path: &Path, outcome: &ComparisonOutcome) {
    println!();
    println!("  Comparison for '{}'", client_path.display());
    println!("  ID:        {}", outcome.id);

    if outcome.missing_key_points.is_empty() {
        println!("  No missing key points found.");
    } else {
        println!("  Missing key points:");
        for point in &outcome.missing_key_points {
            println!("    - {}", point.text.trim());
        }
    }

    if !outcome.suggestions.is_empty() {
        println!("  Suggestions:");
        for line in outcome.suggestions.split("\n\n") {
            println!("    {line}");
        }
    }

    println!("  Paragraphs: {}", outcome.paragraph_count);
    println!("  Inserted:   {}", outcome.inserted_count);
    println!("  Patched:    {}", patched_path.display());
    println!("  Time:       {:.1}s", outcome.elapsed.as_secs_f64());
    println!();
}

fn print_json(
    client_path: &Path,
    patched_path: &Path,
    outcome: &ComparisonOutcome,
) -> Result<()> {
    let value = serde_json::json!({
        "id": outcome.id.to_string(),
        "client": client_path.display().to_string(),
        "missing_key_points": outcome.missing_key_points,
        "suggestions": outcome.suggestions,
        "master_hash": outcome.master_hash,
        "client_hash": outcome.client_hash,
        "paragraph_count": outcome.paragraph_count,
        "inserted_count": outcome.inserted_count,
        "patched_path": patched_path.display().to_string(),
        "elapsed_ms": outcome.elapsed.as_millis() as u64,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &ComparisonOutcome) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// signup
// ---------------------------------------------------------------------------

async fn cmd_signup(user: &str, password: &str) -> Result<()> {
    let storage = open_user_storage().await?;

    if auth::signup(&storage, user, password).await? {
        println!("Account '{user}' created.");
        Ok(())
    } else {
        Err(eyre!("username '{user}' already exists"))
    }
}

/// Open the user database under the config directory.
async fn open_user_storage() -> Result<Storage> {
    let db_path = config_dir()?.join("users.db");
    Ok(Storage::open(&db_path).await?)
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
