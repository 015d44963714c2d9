use crate::app::status::{render_session_line, render_status};
use crate::cli::commands::{Cli, Commands};
use aegis_gate::Config;
use aegis_gate::eval::EvalHarness;
use aegis_gate::governance::{GovernanceDecision, Orchestrator, Session};
use aegis_gate::llm::OpenAiCompatibleClient;
use aegis_gate::ui::{render_decision, style as ui};
use anyhow::{Context, Result, bail};
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    config.validate_remote()?;
    let endpoint = config
        .provider
        .endpoint
        .as_deref()
        .context("provider.endpoint is not set")?;

    let client = OpenAiCompatibleClient::new(
        "inference",
        endpoint,
        config.provider.api_key.as_deref(),
        config.provider.auth_style,
        config.provider.timeout_secs,
    );
    Ok(Orchestrator::from_config(config, Arc::new(client)))
}

/// Run one turn, cancelling it if Ctrl-C arrives before it finishes.
async fn governed_turn(
    orchestrator: &Orchestrator,
    session: &mut Session,
    input: &str,
) -> GovernanceDecision {
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let decision = orchestrator
        .process_with_cancel(session, input, &cancel)
        .await;
    watcher.abort();

    if cancel.is_cancelled() {
        println!("{}", ui::dim("(request cancelled)"));
    }
    decision
}

async fn run_chat(config: &Config, caller: String) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let mut session = Session::new(caller);

    println!("{}", ui::header(render_status(config, orchestrator.governor_version())));
    println!();
    println!("{}", ui::dim("Type `exit` or `quit` to leave."));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ui::accent("you>"));
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let decision = governed_turn(&orchestrator, &mut session, input).await;
        println!("{}", render_decision(&decision));
        println!("{}", ui::dim(render_session_line(&session)));
    }

    println!("{}", ui::success("Goodbye."));
    Ok(())
}

async fn run_ask(config: &Config, message: &str, caller: String) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let mut session = Session::new(caller);
    let decision = governed_turn(&orchestrator, &mut session, message).await;
    println!("{}", render_decision(&decision));
    Ok(())
}

async fn run_eval(config: &Config, json: bool) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let report = EvalHarness::default().run(&orchestrator).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    if !report.all_passed() {
        bail!("{} eval scenario(s) failed", report.failed);
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Chat { caller } => run_chat(&config, caller).await,
        Commands::Ask { message, caller } => run_ask(&config, &message, caller).await,
        Commands::Eval { json } => run_eval(&config, json).await,
        Commands::Config => {
            let shown = toml::to_string_pretty(&config.redacted())
                .context("Failed to render configuration")?;
            println!("{} {}", ui::cyan("#"), ui::value(config.config_path.display()));
            print!("{shown}");
            Ok(())
        }
    }
}
