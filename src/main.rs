#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use vttai::app_config::{self, Config, TranslationProvider};
use vttai::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
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
    /// Check that the configured translation provider is reachable
    Check {
        /// Translation provider to check instead of the configured one
        #[arg(short, long, value_enum)]
        provider: Option<CliTranslationProvider>,

        /// Configuration file path
        #[arg(short, long = "config", default_value = "conf.json")]
        config_path: PathBuf,
    },

    /// Generate shell completions for vttai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// vttai - WebVTT subtitle translation with AI
///
/// Translates the dialogue lines of a WebVTT file and copies cue timings
/// and blank lines through unchanged.
#[derive(Parser, Debug)]
#[command(name = "vttai")]
#[command(version)]
#[command(about = "AI-powered WebVTT subtitle translation tool")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "vttai translates the dialogue of a WebVTT subtitle file with an AI provider, \
keeping every cue timing and blank line exactly where it was.

EXAMPLES:
    vttai movie.en.vtt movie.fr.vtt fr                  # Translate into French using conf.json
    vttai -p openai -m gpt-4 movie.vtt out/movie.vtt de # Use a specific provider and model
    vttai --source-language ja anime.vtt anime.en.vtt en
    vttai check -p ollama                               # Check that the provider is reachable
    vttai completions bash > vttai.bash                 # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// WebVTT file to translate
    #[arg(value_name = "SOURCE")]
    source: Option<PathBuf>,

    /// Where to write the translated file
    #[arg(value_name = "DESTINATION")]
    destination: Option<PathBuf>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(value_name = "LANGUAGE")]
    language: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code, used to phrase the prompt
    #[arg(short, long)]
    source_language: Option<String>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Arguments of a translation run
#[derive(Debug)]
struct TranslateArgs {
    source: PathBuf,
    destination: PathBuf,
    language: String,
    provider: Option<CliTranslationProvider>,
    model: Option<String>,
    source_language: Option<String>,
    config_path: PathBuf,
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI color sequence for log level
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
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logger accepts everything; the effective level is set later with set_max_level
    if CustomLogger::init(LevelFilter::Trace).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vttai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Check { provider, config_path }) => run_check(provider, config_path).await,
        None => match translate_args(cli) {
            Ok(args) => run_translate(args).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn translate_args(cli: CommandLineOptions) -> Result<TranslateArgs> {
    let (Some(source), Some(destination), Some(language)) = (cli.source, cli.destination, cli.language) else {
        return Err(anyhow!("SOURCE, DESTINATION and LANGUAGE are required when no subcommand is specified"));
    };

    Ok(TranslateArgs {
        source,
        destination,
        language,
        provider: cli.provider,
        model: cli.model,
        source_language: cli.source_language,
        config_path: cli.config_path,
        log_level: cli.log_level,
    })
}

// @applies: Command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    config.target_language = options.language.clone();

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // Command line level applies before the config is even read
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", options.config_path))?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    info!("Translating {:?} into '{}'", options.source, config.target_language);

    let controller = Controller::with_config(config);
    let stats = controller.translate_file(&options.source, &options.destination).await?;

    info!("Success: {:?} ({} line(s) translated)", options.destination, stats.translated_lines);

    Ok(())
}

async fn run_check(provider: Option<CliTranslationProvider>, config_path: PathBuf) -> Result<()> {
    let mut config = Config::load_or_create(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    if let Some(provider) = provider {
        config.translation.provider = provider.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    Controller::with_config(config).test_connection().await?;
    Ok(())
}
