use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use checkup_core::CheckupError;
use checkup_core::api::{HttpConnector, HttpTimeouts};
use checkup_core::auth::{CachedCredentials, SecretSource, SecretStoreProvider};
use checkup_core::report::render;
use checkup_core::workflow::{Execution, LogSink, Orchestrator, Outcome, PollState, WriterSink};

mod args;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = args::Args::parse();

    let (common, execution) = match args.command {
        args::Command::Upload(upload) => {
            let mut orchestrator = Orchestrator::new(
                upload.step_config(),
                credentials(&upload.common),
                connector(),
                Arc::new(WriterSink::stderr()),
            );
            if let Some(path) = &upload.state_file {
                orchestrator = orchestrator.with_state_file(path);
            }
            (upload.common, orchestrator.start().await)
        }
        args::Command::Resume(resume) => {
            let state = PollState::load(&resume.state_file)
                .await
                .unwrap_or_else(|err| exit_with(err));
            let orchestrator = Orchestrator::new(
                state.config.clone(),
                credentials(&resume.common),
                connector(),
                Arc::new(WriterSink::stderr()),
            )
            .with_state_file(&resume.state_file);
            (resume.common, orchestrator.resume(state).await)
        }
    };

    match finish(execution).await {
        Ok(outcome) => {
            let output = match common.format {
                args::OutputFormat::Json => serde_json::to_string_pretty(&outcome)?,
                args::OutputFormat::Text => render::render_text(&outcome),
            };
            print!("{output}");
            Ok(())
        }
        Err(err) => std::process::exit(err.exit_code()),
    }
}

/// Reports an error raised outside the orchestration and exits.
fn exit_with(err: CheckupError) -> ! {
    WriterSink::stderr().error(&err);
    std::process::exit(err.exit_code())
}

fn connector() -> HttpConnector {
    HttpConnector::new(HttpTimeouts::default()).unwrap_or_else(|err| exit_with(err))
}

fn credentials(common: &args::CommonArgs) -> Arc<CachedCredentials<SecretStoreProvider>> {
    let source = match &common.secrets_dir {
        Some(dir) => SecretSource::Directory(dir.clone()),
        None => SecretSource::Environment,
    };
    Arc::new(CachedCredentials::new(SecretStoreProvider::new(source)))
}

/// Waits for the run, turning Ctrl-C into a stop request.
async fn finish(execution: Execution) -> Result<Outcome, CheckupError> {
    let stop = execution.stop_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop("interrupted");
        }
    });
    let result = execution.wait().await;
    interrupt.abort();
    result
}
