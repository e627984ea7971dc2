mod cli;

use anyhow::Context;
use book_analysis::services::loader::STDIN_SOURCE;
use book_analysis::services::render_chapter_table;
use book_analysis::{
    AnalysisRequestParams, BookAnalysisError, DocumentLoader, ErrorBoundary, HttpBackend, Result,
    ResultExporter, StatusLevel, StatusReport, WorkflowSession,
};
use clap::Parser;
use cli::{AnalyzeArgs, Cli, Commands, DecodeArgs, SplitArgs};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Decode(args) => handle_decode_command(args).await,
        Commands::Split(args) => handle_split_command(args, &cli).await,
        Commands::Analyze(args) => handle_analyze_command(args, &cli).await,
        Commands::Projects => handle_projects_command(&cli).await,
    };

    if let Err(e) = result {
        if e.is_validation() {
            warn!("{}", e);
        } else {
            error!("Operation failed: {}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_decode_command(args: &DecodeArgs) -> Result<()> {
    let document = DocumentLoader::load(&args.source).await?;

    match &args.output_file {
        Some(path) => {
            tokio::fs::write(path, document.text()).await?;
            info!(
                "Decoded {} chars from '{}' into {}",
                document.char_count(),
                document.source(),
                path.display()
            );
        }
        None => print!("{}", document.text()),
    }

    Ok(())
}

async fn handle_split_command(args: &SplitArgs, cli: &Cli) -> Result<()> {
    let backend = HttpBackend::new(&cli.backend_config())?;
    let (sources, rejected) = DocumentLoader::expand_sources(&args.sources)?;
    for name in &rejected {
        warn!("Skipped '{}': only .txt files are accepted", name);
    }
    info!("Starting split of {} sources", sources.len());

    let params = AnalysisRequestParams::default()
        .with_min_chapter_length(args.min_chapter_length)
        .with_fallback_group_size(args.fallback_group_size);
    let mut boundary = ErrorBoundary::new("ChapterSplit");
    let mut all_splits = BTreeMap::new();
    let mut failures = 0usize;

    for source in &sources {
        let mut session = WorkflowSession::with_params(params.clone());
        let outcome = async {
            session.load_document(DocumentLoader::load(source).await?);
            session.segment(&backend).await
        }
        .await;

        if let Err(e) = outcome {
            error!("Failed to split '{}': {}", source, e);
            failures += 1;
            continue;
        }

        let Some(split) = session.split_result() else {
            continue;
        };

        let rendered = boundary.render(|| {
            Ok::<_, BookAnalysisError>(format!(
                "\n=== Chapters in '{}' ===\n{}{}",
                source,
                StatusReport::for_split(split),
                render_chapter_table(&split.chapters, args.detailed)
            ))
        });
        match rendered {
            Ok(text) => print!("{}", text),
            Err(fault) => {
                warn!("Could not render '{}': {}", source, fault.message);
                boundary.reset();
            }
        }

        all_splits.insert(source.clone(), split.clone());
    }

    if let Some(json_path) = &args.json_output {
        let json_content = serde_json::to_string_pretty(&all_splits)
            .context("Failed to serialize split results")?;
        tokio::fs::write(json_path, json_content)
            .await
            .context("Failed to write JSON split file")?;
        info!("Split results written to: {}", json_path.display());
    }

    if failures > 0 {
        let reason = format!("{} of {} sources failed to split", failures, sources.len());
        return Err(anyhow::anyhow!(reason).into());
    }

    Ok(())
}

async fn handle_analyze_command(args: &AnalyzeArgs, cli: &Cli) -> Result<()> {
    if args.source == STDIN_SOURCE {
        info!("Paste the novel text, then close stdin (Ctrl-D)");
    }

    let backend = HttpBackend::new(&cli.backend_config())?;
    let params = AnalysisRequestParams::default()
        .with_min_chapter_length(args.min_chapter_length)
        .with_fallback_group_size(args.fallback_group_size)
        .with_max_chars(args.max_chars)
        .with_embedding_chunk_size(args.embedding_chunk_size)
        .with_embedding(args.embed, args.project.clone());
    let mut session = WorkflowSession::with_params(params);

    let target = session.params().embedding_target.clone();
    if let Some(project_id) = target.filter(|_| args.embed) {
        let projects = session.projects(&backend).await;
        if !projects.iter().any(|p| p.id == project_id) {
            warn!("Project '{}' is not in the project list", project_id);
        }
    }

    session.load_document(DocumentLoader::load(&args.source).await?);
    let mut boundary = ErrorBoundary::new("BookAnalysis");

    if !args.skip_split {
        session.segment(&backend).await?;
        if let Some(split) = session.split_result() {
            let rendered = boundary.render(|| {
                Ok::<_, BookAnalysisError>(format!(
                    "{}{}",
                    StatusReport::for_split(split),
                    render_chapter_table(&split.chapters, false)
                ))
            });
            if let Ok(text) = rendered {
                eprint!("{}", text);
            }
        }
    }

    if let Some(start) = args.start {
        session.set_start_chapter(start);
    }
    if let Some(end) = args.end {
        session.set_end_chapter(end);
    }
    if session.range().is_inverted() {
        warn!(
            "Start chapter {} is after end chapter {}",
            session.range().start(),
            session.range().end()
        );
    }

    session.analyze(&backend).await?;
    let Some(result) = session.analysis() else {
        return Ok(());
    };

    // Chapter list faults do not carry over to the report.
    boundary.reset();
    match boundary.render(|| Ok::<_, BookAnalysisError>(StatusReport::for_analysis(result))) {
        Ok(report) => {
            eprint!("{}", report);
            if report.level == StatusLevel::Warning {
                warn!("{}", report.headline);
            }
        }
        Err(fault) => warn!("Could not render analysis status: {}", fault.message),
    }

    if let Some(export) = session.export_download() {
        let path = ResultExporter::write_to_dir(&export, &cli.output).await?;
        info!("Report saved to {}", path.display());
    }

    if args.print {
        if let Some(text) = session.clipboard_text() {
            println!("{}", text);
        }
    }

    if let Some(json_path) = &args.json_output {
        write_json(json_path, result).await?;
    }

    Ok(())
}

async fn handle_projects_command(cli: &Cli) -> Result<()> {
    let backend = HttpBackend::new(&cli.backend_config())?;
    let mut session = WorkflowSession::new();
    let projects = session.projects(&backend).await;

    if projects.is_empty() {
        println!("No projects found");
        return Ok(());
    }

    println!("{} projects:", projects.len());
    for project in projects {
        println!("  {}  {}", project.id, project.title);
    }

    Ok(())
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json_content =
        serde_json::to_string_pretty(value).context("Failed to serialize analysis result")?;
    tokio::fs::write(path, json_content)
        .await
        .context("Failed to write JSON analysis file")?;
    info!("Analysis result written to: {}", path.display());
    Ok(())
}
