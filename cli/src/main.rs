//! CLI entrypoint for autofix-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use autofix_application::{
    AdjudicationStrategy, AnalysisBackend, CodeSource, FirstSeenWins, LlmGateway,
    ModelArbitration, NoProgress, ProgressNotifier, RunWorkflowInput, RunWorkflowUseCase,
    WorkingCopy,
};
use autofix_domain::{BackendId, OutputFormat};
use autofix_infrastructure::{
    ChatCompletionsGateway, ConfigLoader, FileAdjudication, FileBackendConfig, FileConfig,
    GitWorkingCopy, InMemoryWorkingCopy, JsonFileResultStore, JsonlRunEventLogger,
    LlmAnalysisBackend, LocalCodeSource,
};
use autofix_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = load_config(&cli)?;
    info!("Starting autofix-council on {}", cli.repo_dir.display());

    let mut params = config
        .to_workflow_params()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    if let Some(max_retries) = cli.max_retries {
        params = params.with_max_retries(max_retries);
    }
    if let Some(remote) = &cli.remote {
        params = params.with_remote(remote.clone());
    }
    if cli.no_push {
        params = params.without_push();
    }

    let format: OutputFormat = cli.output.map(Into::into).unwrap_or(config.output.format);
    if !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let selected = select_backends(&config, &cli.backends)?;
    let mut backends: Vec<Arc<dyn AnalysisBackend>> = Vec::with_capacity(selected.len());
    for backend in &selected {
        let gateway: Arc<dyn LlmGateway> = Arc::new(build_gateway(backend)?);
        let id = BackendId::try_new(backend.name.as_str())
            .ok_or_else(|| anyhow!("Backend name cannot be empty"))?;
        backends.push(Arc::new(
            LlmAnalysisBackend::new(id, backend.model.as_str(), gateway)
                .with_max_chars_per_file(config.source.max_chars_per_file),
        ));
    }

    let adjudicator: Arc<dyn AdjudicationStrategy> = match config.workflow.adjudication {
        FileAdjudication::FirstSeen => Arc::new(FirstSeenWins),
        FileAdjudication::Model => {
            let name = config
                .workflow
                .arbiter
                .as_deref()
                .ok_or_else(|| anyhow!("adjudication = \"model\" requires workflow.arbiter"))?;
            let arbiter = config
                .backend(name)
                .ok_or_else(|| anyhow!("Unknown arbiter '{}'", name))?;
            Arc::new(ModelArbitration::new(
                Arc::new(build_gateway(arbiter)?),
                arbiter.model.as_str(),
            ))
        }
    };

    let code_source = Arc::new(
        LocalCodeSource::new(&cli.repo_dir)
            .with_extensions(&config.source.extensions)
            .with_max_files(config.source.max_files),
    );

    let working_copy: Arc<dyn WorkingCopy> = if cli.dry_run {
        let files = code_source
            .load()
            .await
            .context("Failed to load files for the dry run")?;
        info!("Dry run: {} file(s) loaded into memory", files.len());
        Arc::new(InMemoryWorkingCopy::from_files(files))
    } else {
        Arc::new(GitWorkingCopy::new(&cli.repo_dir))
    };

    let run_id = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();

    let mut use_case = RunWorkflowUseCase::new(backends, code_source, working_copy)
        .with_params(params)
        .with_adjudicator(adjudicator)
        .with_result_store(Arc::new(JsonFileResultStore::new(&config.output.results_dir)));
    match JsonlRunEventLogger::for_run(&config.output.events_dir, &run_id) {
        Some(events) => {
            info!("Writing run events to {}", events.path().display());
            use_case = use_case.with_event_logger(Arc::new(events));
        }
        None => warn!("Run events disabled"),
    }

    let input = RunWorkflowInput::new(run_id, cli.team.as_str(), cli.leader.as_str());

    let progress: Box<dyn ProgressNotifier> = if cli.quiet || format == OutputFormat::Json {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let report = use_case
        .execute_with_progress(input, progress.as_ref())
        .await
        .context("Run failed")?;

    println!("{}", ConsoleFormatter::render(&report, format));

    Ok(())
}

/// Install the tracing subscriber; the guard keeps the file writer alive
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match &cli.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("--log-file needs a file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Configured backends, narrowed to `names` when any are given
fn select_backends<'a>(config: &'a FileConfig, names: &[String]) -> Result<Vec<&'a FileBackendConfig>> {
    if names.is_empty() {
        return Ok(config.backends.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            config.backend(name).ok_or_else(|| {
                let known: Vec<&str> = config.backends.iter().map(|b| b.name.as_str()).collect();
                anyhow!("Unknown backend '{}' (configured: {})", name, known.join(", "))
            })
        })
        .collect()
}

fn build_gateway(backend: &FileBackendConfig) -> Result<ChatCompletionsGateway> {
    if backend.api_key_env.is_none() {
        warn!("Backend '{}' has no api_key_env; sending unauthenticated requests", backend.name);
    }
    ChatCompletionsGateway::new(&backend.base_url, backend.api_key_env.as_deref())
        .with_context(|| format!("Failed to set up backend '{}'", backend.name))
}
