// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, LogLevel};
use crate::file_utils::FileManager;
use crate::orchestrator::{BatchRequest, EventSink, JobStatus, Orchestrator};
use crate::processing::{DocumentProcessor, PlainTextProcessor};
use crate::providers::{ProviderId, ProviderRegistry, ProviderSelection};
use crate::vault::{CredentialVault, VaultStatus};

mod app_config;
mod errors;
mod file_utils;
mod languages;
mod orchestrator;
mod processing;
mod providers;
mod vault;

/// CLI Wrapper for ProviderId to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliProvider {
    OpenAi,
    Anthropic,
    DeepSeek,
    Grok,
    Gemini,
    Glm,
}

impl From<CliProvider> for ProviderId {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::OpenAi => ProviderId::OpenAi,
            CliProvider::Anthropic => ProviderId::Anthropic,
            CliProvider::DeepSeek => ProviderId::DeepSeek,
            CliProvider::Grok => ProviderId::Grok,
            CliProvider::Gemini => ProviderId::Gemini,
            CliProvider::Glm => ProviderId::Glm,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate document files using AI providers
    Translate(TranslateArgs),

    /// List the available translation providers and their models
    Providers,

    /// List the supported languages
    Languages,

    /// Manage stored provider credentials
    Credential {
        #[command(subcommand)]
        action: CredentialAction,
    },

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum CredentialAction {
    /// Store a credential for a provider
    Set {
        /// Provider to store the credential for
        #[arg(value_enum)]
        provider: CliProvider,

        /// API key; read from stdin when omitted
        #[arg(long)]
        api_key: Option<String>,

        /// Endpoint override for the provider
        #[arg(long)]
        endpoint: Option<String>,

        /// Preferred model for the provider
        #[arg(long)]
        model: Option<String>,
    },

    /// Remove a provider's stored credential
    Remove {
        /// Provider to remove the credential for
        #[arg(value_enum)]
        provider: CliProvider,
    },

    /// Show where each provider's credential would come from
    Status,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input document files or directories to process
    #[arg(value_name = "PATHS", required = true)]
    paths: Vec<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'zh', 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'zh', 'en')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Max concurrent translation requests within one file
    #[arg(long)]
    max_workers: Option<usize>,

    /// Keep partial artifacts when a file fails
    #[arg(long)]
    keep_intermediate: bool,

    /// Directory for translated outputs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// doctrans - AI-powered document translation
///
/// A batch translation tool that dispatches document text to LLM providers
/// while isolating per-file failures and supporting cancellation.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version = "0.1.0")]
#[command(about = "AI-powered batch document translation tool")]
#[command(long_about = "doctrans translates batches of document files using LLM providers.

EXAMPLES:
    doctrans translate report.txt                   # Translate with config defaults
    doctrans translate -p openai -m gpt-4o docs/    # Use a specific provider and model
    doctrans translate -s zh -t en a.txt b.txt      # Translate Chinese to English
    doctrans credential set openai                  # Store an API key (read from stdin)
    doctrans credential status                      # Show credential sources
    doctrans providers                              # List providers and models
    doctrans completions bash > doctrans.bash       # Generate bash completions

CONFIGURATION:
    Settings live in config.json in the per-user data directory; a default
    file is created on first run. Command-line flags override the file.

CREDENTIALS:
    API keys are stored encrypted in credentials.json next to the config
    file. When no key is stored the provider's environment variable
    (e.g. OPENAI_API_KEY) is used instead.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Terminal event sink backed by an indicatif progress bar
struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("[{bar:40}] {percent}% {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl EventSink for ProgressBarSink {
    fn on_progress(&self, percent: f32, status: &str, _current: usize, _total: usize) {
        self.bar.set_position(percent.clamp(0.0, 100.0) as u64);
        self.bar.set_message(status.to_string());
    }

    fn on_log(&self, message: &str) {
        self.bar.println(message.to_string());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Providers => {
            run_providers();
            Ok(())
        }
        Commands::Languages => {
            run_languages();
            Ok(())
        }
        Commands::Credential { action } => run_credential(action),
        Commands::Translate(args) => run_translate(args).await,
    }
}

fn run_providers() {
    let registry = ProviderRegistry::new();
    println!("{:<11} {:<16} {:<26} MODELS", "ID", "NAME", "DEFAULT MODEL");
    for descriptor in registry.descriptors() {
        println!(
            "{:<11} {:<16} {:<26} {}",
            descriptor.id,
            descriptor.display_name,
            descriptor.default_model,
            descriptor.models.join(", ")
        );
    }
}

fn run_languages() {
    println!("{:<7} NAME", "CODE");
    for (code, name) in languages::LANGUAGES {
        println!("{:<7} {}", code, name);
    }
}

fn run_credential(action: CredentialAction) -> Result<()> {
    let mut vault = CredentialVault::open(&app_config::app_data_dir())?;

    match action {
        CredentialAction::Set {
            provider,
            api_key,
            endpoint,
            model,
        } => {
            let provider: ProviderId = provider.into();
            let api_key = match api_key {
                Some(key) => key,
                None => {
                    eprint!("API key for {}: ", provider.display_name());
                    let mut line = String::new();
                    std::io::stdin()
                        .read_line(&mut line)
                        .context("Failed to read the API key from stdin")?;
                    line.trim().to_string()
                }
            };
            if api_key.is_empty() {
                return Err(anyhow!("API key must not be empty"));
            }

            let status = vault.put(provider.as_str(), &api_key)?;
            if status == VaultStatus::Degraded {
                warn!("The credential was stored without encryption");
            }
            if let Some(endpoint) = endpoint {
                vault.set_endpoint(provider.as_str(), &endpoint)?;
            }
            if let Some(model) = model {
                vault.set_model(provider.as_str(), &model)?;
            }
            info!("Stored credential for {}", provider.display_name());
            Ok(())
        }
        CredentialAction::Remove { provider } => {
            let provider: ProviderId = provider.into();
            if vault.delete(provider.as_str())? {
                info!("Removed credential for {}", provider.display_name());
            } else {
                warn!("No credential stored for {}", provider.display_name());
            }
            Ok(())
        }
        CredentialAction::Status => {
            let registry = ProviderRegistry::new();
            println!("{:<11} SOURCE", "PROVIDER");
            for descriptor in registry.descriptors() {
                let source = if vault.has_secret(descriptor.id.as_str()) {
                    "vault".to_string()
                } else if std::env::var(descriptor.api_key_env)
                    .is_ok_and(|value| !value.is_empty())
                {
                    format!("env ({})", descriptor.api_key_env)
                } else {
                    "none".to_string()
                };
                println!("{:<11} {}", descriptor.id, source);
            }
            if !vault.is_encrypting() {
                warn!("The credential vault is running without encryption");
            }
            Ok(())
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = options.log_level {
        let level: LogLevel = cmd_log_level.into();
        log::set_max_level(level.into());
    }

    // Load or create configuration, then apply CLI overrides
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(app_config::default_config_path);
    let mut config = Config::load_or_create(&config_path)?;

    if let Some(provider) = options.provider {
        config.default_provider = provider.into();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(max_workers) = options.max_workers {
        config.max_workers = max_workers;
    }
    if options.keep_intermediate {
        config.keep_intermediate = true;
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_directory = output_dir.display().to_string();
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.into());
    }

    // Explicit instances, constructed once and passed where needed
    let vault = CredentialVault::open(&app_config::app_data_dir())?;
    let registry = Arc::new(ProviderRegistry::new());

    let mut processor = PlainTextProcessor::new().with_max_chunk_size(config.max_chunk_size);
    if !config.output_directory.is_empty() {
        FileManager::ensure_dir(&config.output_directory)?;
        processor = processor.with_output_dir(&config.output_directory);
    }

    let files = FileManager::collect_inputs(&options.paths, processor.supported_extensions())?;
    if files.is_empty() {
        return Err(anyhow!("No translatable files found in the given paths"));
    }

    let provider = config.default_provider;
    let mut selection = ProviderSelection::new(provider)
        .with_timeout(Duration::from_secs(config.request_timeout_secs));
    if let Some(api_key) = registry.resolve_credential(&vault, provider) {
        selection = selection.with_api_key(api_key);
    }
    if let Some(entry) = vault.credential(provider.as_str()) {
        if !entry.endpoint.is_empty() {
            selection = selection.with_endpoint(entry.endpoint.clone());
        }
        if options.model.is_none() && !entry.model.is_empty() {
            selection = selection.with_model(entry.model.clone());
        }
    }
    if let Some(model) = &options.model {
        selection = selection.with_model(model.clone());
    }

    let sink = Arc::new(ProgressBarSink::new());
    let orchestrator = Orchestrator::new(registry, Arc::new(processor), sink.clone());

    info!(
        "doctrans: {} file(s), {} -> {}",
        files.len(),
        config.source_language,
        config.target_language
    );

    orchestrator.start(BatchRequest {
        files,
        provider: selection,
        source_lang: config.source_language.clone(),
        target_lang: config.target_language.clone(),
        max_workers: config.max_workers,
        cleanup: !config.keep_intermediate,
    })?;

    // Ctrl-C requests cooperative cancellation; the file in flight finishes
    let canceller = orchestrator.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancellation requested, finishing the current file");
            canceller.cancel();
        }
    });

    orchestrator.join().await;
    sink.finish();

    let snapshot = orchestrator
        .snapshot()
        .ok_or_else(|| anyhow!("The batch left no result to report"))?;
    let succeeded = snapshot.count(JobStatus::Succeeded);
    let failed = snapshot.count(JobStatus::Failed);
    let cancelled = snapshot.count(JobStatus::Cancelled);

    info!(
        "Result: {} succeeded, {} failed, {} cancelled",
        succeeded, failed, cancelled
    );

    if succeeded == 0 {
        return Err(anyhow!("No files were translated"));
    }
    Ok(())
}
