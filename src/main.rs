// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use doclingo::app_config::{self, Config, TranslationProvider};
use doclingo::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "libretranslate")]
    LibreTranslate,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::LibreTranslate => TranslationProvider::LibreTranslate,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
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

/// Options shared by every command that needs a configuration
#[derive(clap::Args, Debug, Clone)]
struct CommonArgs {
    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Translation service URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr' or 'auto')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a PDF or JSON page dump into a new PDF
    Translate {
        /// Input document or directory to process
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Directory for the translated PDF (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Print the rows and images extracted from a document
    Extract {
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Write the text to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Translate a piece of text and list the alternatives
    Text {
        text: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List the languages the translation service supports
    Languages {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate shell completions for doclingo
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// DocLingo - document translation with layout reconstruction
///
/// Extracts text rows and images from PDF pages, translates them through a
/// LibreTranslate-compatible service and rebuilds a translated PDF.
#[derive(Parser, Debug)]
#[command(name = "doclingo")]
#[command(version)]
#[command(about = "Document translation tool")]
#[command(long_about = "DocLingo extracts the text rows and images of a document, translates them and exports a new PDF.

EXAMPLES:
    doclingo translate report.pdf                   # Translate using default config
    doclingo translate -f report.pdf                # Force overwrite existing files
    doclingo translate -s en -t de report.pdf       # Translate from English to German
    doclingo translate -o out/ ./documents/         # Process an entire directory
    doclingo extract report.pdf                     # Show extracted rows without translating
    doclingo text \"Good morning\" -t es              # Translate one block with alternatives
    doclingo languages                              # List languages of the service
    doclingo completions bash > doclingo.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
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

    // @returns: ANSI colour for log level
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
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doclingo", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate {
            input_path,
            output_dir,
            force_overwrite,
            common,
        } => {
            let controller = Controller::with_config(load_config(&common)?)?;
            if input_path.is_file() {
                let output_dir = output_dir
                    .unwrap_or_else(|| input_path.parent().unwrap_or(Path::new(".")).to_path_buf());
                controller.run(input_path, output_dir, force_overwrite).await?;
            } else if input_path.is_dir() {
                controller.run_folder(input_path, force_overwrite).await?;
            } else {
                return Err(anyhow!("Input path does not exist: {:?}", input_path));
            }
            Ok(())
        }
        Commands::Extract {
            input_path,
            output,
            common,
        } => {
            let controller = Controller::with_config(load_config(&common)?)?;
            controller.extract(&input_path, output.as_deref())
        }
        Commands::Text { text, common } => {
            let controller = Controller::with_config(load_config(&common)?)?;
            let record = controller.translate_text(&text).await?;
            println!("{}", record.primary());
            for (i, alternative) in record.alternatives().iter().enumerate() {
                println!("  {}. {}", i + 1, alternative);
            }
            Ok(())
        }
        Commands::Languages { common } => {
            let controller = Controller::with_config(load_config(&common)?)?;
            for language in controller.list_languages().await? {
                println!("{:<6} {}", language.code, language.name);
            }
            Ok(())
        }
    }
}

/// Load or create the configuration, then apply command line overrides
fn load_config(options: &CommonArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.into());
    }

    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", options.config_path);
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", options.config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(endpoint) = &options.endpoint {
        config.translation.endpoint = endpoint.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.into());
    }

    info!(
        "{} -> {} via {}",
        config.source_language,
        config.target_language,
        config.translation.provider.display_name()
    );
    Ok(config)
}
