// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subtrans::app_config::{self, Config, TranslationProvider};
use subtrans::app_controller::Controller;
use subtrans::checkpoint::CheckpointStore;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an SRT subtitle file (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Subtitle file to translate
    #[arg(value_name = "INPUT")]
    input_path: PathBuf,

    /// Where to write the translated subtitles
    #[arg(value_name = "OUTPUT")]
    output_path: PathBuf,

    /// Source language (e.g., 'en', 'English')
    #[arg(short, long)]
    source_language: String,

    /// Target language (e.g., 'fr', 'French')
    #[arg(short, long)]
    target_language: String,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Report each step and hint how to resume on failure
    #[arg(short, long)]
    verbose: bool,

    /// Number of subtitle entries per request
    #[arg(long)]
    batch_size: Option<usize>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subtrans - resumable subtitle translation with AI
///
/// Translates SRT files in batches and keeps a checkpoint next to the output,
/// so an interrupted run continues where it stopped.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "Resumable AI subtitle translation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "subtrans translates SRT subtitle files with an AI provider, one batch of entries at a time.

After every batch the translated part is written to OUTPUT and recorded in
OUTPUT.checkpoint. If a run is interrupted, running the same command again
continues from the last completed batch.

EXAMPLES:
    subtrans movie.en.srt movie.fr.srt -s en -t fr
    subtrans translate movie.en.srt movie.fr.srt -s en -t fr -v
    subtrans movie.srt out/movie.de.srt -s English -t German -p anthropic
    subtrans movie.srt movie.es.srt -s en -t es --batch-size 25 -m gpt-4o
    subtrans completions bash > subtrans.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

    Credentials are read from OPENAI_API_KEY or ANTHROPIC_API_KEY depending on
    the provider. LM Studio needs none.

SUPPORTED PROVIDERS:
    openai    - OpenAI API or any OpenAI-compatible server
    anthropic - Anthropic Claude API
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Subtitle file to translate
    #[arg(value_name = "INPUT")]
    input_path: Option<PathBuf>,

    /// Where to write the translated subtitles
    #[arg(value_name = "OUTPUT")]
    output_path: Option<PathBuf>,

    /// Source language (e.g., 'en', 'English')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language (e.g., 'fr', 'French')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Report each step and hint how to resume on failure
    #[arg(short, long)]
    verbose: bool,

    /// Number of subtitle entries per request
    #[arg(long)]
    batch_size: Option<usize>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

impl CommandLineOptions {
    // Top-level arguments, for when the `translate` subcommand is omitted
    fn into_translate_args(self) -> Result<TranslateArgs> {
        let missing = |name: &str| anyhow!("{} is required when no subcommand is specified", name);

        Ok(TranslateArgs {
            input_path: self.input_path.ok_or_else(|| missing("INPUT"))?,
            output_path: self.output_path.ok_or_else(|| missing("OUTPUT"))?,
            source_language: self.source_language.ok_or_else(|| missing("--source-language"))?,
            target_language: self.target_language.ok_or_else(|| missing("--target-language"))?,
            config_path: self.config_path,
            verbose: self.verbose,
            batch_size: self.batch_size,
            provider: self.provider,
            model: self.model,
            log_level: self.log_level,
        })
    }
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger; the level is adjusted later with log::set_max_level
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
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
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Info until the configuration says otherwise
    if CustomLogger::init(LevelFilter::Info).is_err() {
        eprintln!("Failed to initialize logger");
    }

    let cli = CommandLineOptions::parse();

    let args = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
            return;
        }
        Some(Commands::Translate(args)) => Ok(args),
        None => cli.into_translate_args(),
    };

    let result = match args {
        Ok(args) => {
            let verbose = args.verbose;
            let output_path = args.output_path.clone();
            run_translate(args).await.map_err(|e| {
                error!("Error: {:#}", e);
                if verbose && CheckpointStore::for_output(&output_path).exists() {
                    error!("Completed batches are saved; rerun the same command to resume from the checkpoint");
                }
            })
        }
        Err(e) => {
            error!("Error: {:#}", e);
            Err(())
        }
    };

    if result.is_err() {
        std::process::exit(1);
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cli_level) = &options.log_level {
        let level: app_config::LogLevel = cli_level.clone().into();
        log::set_max_level(level.to_level_filter());
    } else if options.verbose {
        log::set_max_level(LevelFilter::Debug);
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(batch_size) = options.batch_size {
        config.translation.common.batch_size = batch_size;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() && !options.verbose {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?.verbose(options.verbose);

    controller
        .run(
            &options.input_path,
            &options.output_path,
            &options.source_language,
            &options.target_language,
        )
        .await?;

    Ok(())
}
