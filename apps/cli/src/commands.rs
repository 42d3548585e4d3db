//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use askmail_artifacts::PdfRenderer;
use askmail_core::{Collaborators, Outcome, Pipeline, ProgressReporter, Stage};
use askmail_llm::ChatClient;
use askmail_mail::SmtpDispatcher;
use askmail_shared::{
    AppConfig, init_config, load_config, resolve_llm_settings, resolve_mail_settings,
};

use crate::input::TerminalInput;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// askmail: ask a language model, get the answer by mail as a PDF.
#[derive(Parser)]
#[command(
    name = "askmail",
    version,
    about = "Ask a language model a question and receive the answer by mail as a PDF.",
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
    /// Ask a question and mail the answer.
    Ask {
        /// Question to ask (prompted for when omitted).
        #[arg(short, long)]
        question: Option<String>,

        /// Recipient address (prompted for when omitted).
        #[arg(short, long)]
        to: Option<String>,

        /// Directory for the rendered PDF (defaults to output.dir).
        #[arg(long)]
        out_dir: Option<PathBuf>,
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

/// Initialize tracing based on CLI flags. Logs go to stderr so prompts and
/// results on stdout stay readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "askmail=warn",
        1 => "askmail=info",
        2 => "askmail=debug",
        _ => "askmail=trace",
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
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Ask {
            question,
            to,
            out_dir,
        } => cmd_ask(question, to, out_dir).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_ask(
    question: Option<String>,
    to: Option<String>,
    out_dir: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut config = load_config()?;
    if let Some(dir) = out_dir {
        config.output.dir = dir.to_string_lossy().into_owned();
    }

    // Settings are resolved once, before the run starts.
    let env = |key: &str| std::env::var(key).ok();
    let llm = resolve_llm_settings(&config, env)?;
    let mail = resolve_mail_settings(&config, env);
    info!(?llm, ?mail, "settings resolved");

    let model = ChatClient::new(&llm)?;
    info!(endpoint = model.endpoint(), model = %llm.model, "language model ready");

    let collaborators = Collaborators {
        input: Arc::new(TerminalInput::stdio([question, to])),
        model: Arc::new(model),
        renderer: Arc::new(PdfRenderer::from_config(&config.output)),
        mailer: Arc::new(SmtpDispatcher::new(mail)),
    };

    println!("--- Asistente de IA v2 ---");

    let progress = CliProgress::new();
    let report = Pipeline::standard(collaborators).run(&progress).await;

    if !report.state.intention().is_empty() {
        println!("Intención detectada: {}", report.state.intention());
    }
    let code = match &report.outcome {
        Outcome::Delivered {
            recipient,
            subject,
            attachment,
        } => {
            println!("Correo enviado exitosamente a {recipient}.");
            println!("  Asunto:  {subject}");
            println!("  Adjunto: {attachment}");
            ExitCode::SUCCESS
        }
        Outcome::Reported(failure) => {
            println!();
            println!("[PROCESO INTERRUMPIDO] {failure}");
            ExitCode::FAILURE
        }
    };
    println!("  Tiempo:  {:.1}s", report.elapsed.as_secs_f64());
    println!();
    println!("--- Proceso finalizado. ---");

    Ok(code)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shown while the model and the mail relay are working. Stays
/// hidden during input so prompts are not overdrawn.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        Self { spinner }
    }
}

fn phase_message(stage: Stage) -> Option<&'static str> {
    match stage {
        Stage::Input => None,
        Stage::IntentAnalysis => Some("Analizando intención de la pregunta..."),
        Stage::AnswerGeneration => Some("Generando respuesta principal..."),
        Stage::Delivery => Some("Procesando salidas finales..."),
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, stage: Stage) {
        if let Some(message) = phase_message(stage) {
            self.spinner.set_message(message);
            self.spinner.enable_steady_tick(Duration::from_millis(80));
        }
    }

    fn done(&self, _outcome: &Outcome) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<ExitCode> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

async fn cmd_config_show() -> Result<ExitCode> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_accepts_presets() {
        let cli = Cli::try_parse_from([
            "askmail",
            "ask",
            "--question",
            "What is 2+2?",
            "--to",
            "user@example.com",
            "--out-dir",
            "/tmp/out",
        ])
        .unwrap();

        match cli.command {
            Command::Ask {
                question,
                to,
                out_dir,
            } => {
                assert_eq!(question.as_deref(), Some("What is 2+2?"));
                assert_eq!(to.as_deref(), Some("user@example.com"));
                assert_eq!(out_dir, Some(PathBuf::from("/tmp/out")));
            }
            Command::Config { .. } => panic!("expected ask"),
        }
    }

    #[test]
    fn ask_presets_are_optional() {
        let cli = Cli::try_parse_from(["askmail", "ask"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Ask {
                question: None,
                to: None,
                out_dir: None
            }
        ));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["askmail", "config", "show", "-vv", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
    }

    #[test]
    fn spinner_stays_hidden_during_input() {
        assert_eq!(phase_message(Stage::Input), None);
        assert!(phase_message(Stage::Delivery).is_some());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
