mod prompt;

use clap::{ArgAction, Parser};
use jorin_agent::{CancelHandle, Policy, SessionConfig, SessionDriver, ToolRegistry, ToolServices};
use jorin_llm::{BackendConfig, Protocol, ReqwestTransport, Transcript, build_adapter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jorin")]
#[command(about = "Coding assistant that lets a model drive shell, file and HTTP tools")]
struct Cli {
    /// Prompt text. Piped stdin is appended.
    prompt: Option<String>,
    /// Extra arguments passed along to the model.
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
    /// Model id (overrides JORIN_MODEL).
    #[arg(long)]
    model: Option<String>,
    /// Talk to the stateful responses endpoint instead of chat completions.
    #[arg(long, action = ArgAction::SetTrue)]
    use_responses_api: bool,
    /// Disallow write_file.
    #[arg(long, action = ArgAction::SetTrue)]
    readonly: bool,
    /// Report shell commands instead of running them.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_shell: bool,
    /// Only run shell commands containing one of these substrings.
    #[arg(long = "allow")]
    allow: Vec<String>,
    /// Never run shell commands containing any of these substrings.
    #[arg(long = "deny")]
    deny: Vec<String>,
    /// Working directory for tools.
    #[arg(long)]
    cwd: Option<PathBuf>,
    #[arg(long, default_value_t = SessionConfig::default().max_turns)]
    max_turns: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<ExitCode, String> {
    let stdin = prompt::read_piped_stdin().map_err(|error| error.to_string())?;
    let user_prompt = prompt::build_prompt(cli.prompt.as_deref(), &cli.args, &stdin);
    if user_prompt.trim().is_empty() {
        eprintln!("error: no prompt given (pass text or pipe it on stdin)");
        return Ok(ExitCode::from(2));
    }

    let mut backend = BackendConfig::from_env().map_err(|error| error.to_string())?;
    if let Some(model) = cli.model {
        backend = backend.with_model(model);
    }
    if cli.use_responses_api {
        backend = backend.with_protocol(Protocol::Responses);
    }
    let transport = ReqwestTransport::new(backend.timeout).map_err(|error| error.to_string())?;
    let adapter = build_adapter(&backend, Arc::new(transport));

    let policy = Policy {
        readonly: cli.readonly,
        dry_run: cli.dry_shell,
        allow: cli.allow,
        deny: cli.deny,
        working_directory: cli.cwd,
    };
    let config = SessionConfig::default().with_max_turns(cli.max_turns);
    let registry = Arc::new(ToolRegistry::with_builtins(ToolServices::default()));
    let driver = SessionDriver::new(adapter, registry, policy, config);

    let cancel = CancelHandle::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let transcript = Transcript::new(prompt::SYSTEM_PROMPT, Some(user_prompt));
    let outcome = driver.run(transcript, &cancel).await;
    tracing::debug!(messages = outcome.transcript.len(), "session finished");
    let answer = outcome.result.map_err(|error| error.to_string())?;
    println!("{answer}");
    Ok(ExitCode::SUCCESS)
}
