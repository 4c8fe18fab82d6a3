//! `vedit` command-line editor.

use clap::Parser;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use vedit_media::{EditRequest, EditorSession, JobProgress, OutputArtifact, UploadedInput};
use vedit_models::{FilterPreset, NamedPosition};
use vedit_worker::logging::init_tracing;
use vedit_worker::{Cli, Command, ConvertArgs, EditArgs, EditorConfig, WorkerResult};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    let metrics = if cli.print_metrics {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    let config = match EditorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("{}", e.user_message());
            std::process::exit(2);
        }
    };
    info!("Editor config: {:?}", config);

    let result = run(cli.command, &config).await;
    print_metrics(metrics.as_ref());

    if let Err(e) = result {
        error!("vedit failed: {}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(command: Command, config: &EditorConfig) -> WorkerResult<()> {
    match command {
        Command::Positions => {
            for position in NamedPosition::ALL {
                let (x, y) = position.coordinates();
                println!("{:<14} x={} y={}", position.label(), x, y);
            }
            Ok(())
        }
        Command::Filters => {
            for preset in FilterPreset::ALL {
                println!("{:<12} {}", preset.label(), preset.expression());
            }
            Ok(())
        }
        Command::Edit(args) => edit(args, config).await,
        Command::Convert(args) => convert(args, config).await,
    }
}

async fn edit(args: EditArgs, config: &EditorConfig) -> WorkerResult<()> {
    let mut request = EditRequest::new(args.edit_options(), &args.format);
    if let Some(trim) = args.trim()? {
        request = request.with_trim(trim);
    }
    if let Some(path) = &args.overlay {
        request = request.with_overlay_image(tokio::fs::read(path).await?);
    }

    let mut session = start_session(config).await?;
    session.upload(read_input(&args.input).await?);

    match session.apply(request).await? {
        Some(artifact) => save(&artifact, args.out.as_deref()).await,
        None => {
            info!("No filter, overlay, text or trim given; nothing written");
            Ok(())
        }
    }
}

async fn convert(args: ConvertArgs, config: &EditorConfig) -> WorkerResult<()> {
    let mut session = start_session(config).await?;
    session.upload(read_input(&args.input).await?);

    let artifact = session.convert(&args.format).await?;
    save(&artifact, args.out.as_deref()).await
}

async fn start_session(config: &EditorConfig) -> WorkerResult<EditorSession> {
    let (tx, rx) = mpsc::channel(config.progress_buffer);
    tokio::spawn(report_progress(rx));

    let session = config.session(Some(tx));
    session.start().await?;
    Ok(session)
}

async fn report_progress(mut rx: mpsc::Receiver<JobProgress>) {
    let mut last = None;
    while let Some(progress) = rx.recv().await {
        let key = (progress.stage, progress.percent());
        if last == Some(key) {
            continue;
        }
        last = Some(key);
        info!(
            job_id = %progress.job_id,
            stage = progress.stage,
            stages = progress.stages,
            "Progress {}%",
            progress.percent()
        );
    }
}

async fn read_input(path: &Path) -> WorkerResult<UploadedInput> {
    let bytes = tokio::fs::read(path).await?;
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    Ok(UploadedInput::from_file_name(&name, bytes))
}

async fn save(artifact: &OutputArtifact, out: Option<&Path>) -> WorkerResult<()> {
    let target = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    artifact.save_to(&target).await?;
    info!(
        path = %target.display(),
        mime_type = %artifact.mime_type,
        bytes = artifact.len(),
        "Output written"
    );
    Ok(())
}

fn print_metrics(handle: Option<&PrometheusHandle>) {
    if let Some(handle) = handle {
        eprintln!("{}", handle.render());
    }
}
