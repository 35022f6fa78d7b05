mod pipeline;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use snapstrip_capture::{
    derive_preview_height, surface::draw_capture, CaptureOrchestrator, CaptureOutcome,
    StreamDimensions,
};
use snapstrip_encode::frame_to_data_url;
use snapstrip_layout::templates::StripsTemplate;
use snapstrip_layout::{compose_result_view, Stage, SubtreeHandle};
use snapstrip_render::image_loader::load_image;
use snapstrip_render::Exporter;

use crate::pipeline::{camera_from_arg, filter_for_shot, Pipeline};

#[derive(Parser)]
#[command(
    name = "snapstrip",
    version,
    about = "snapstrip: pick a layout, take the shots, export the strip"
)]
struct Cli {
    /// Path to a snapstrip.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available layouts and how many captures each needs
    Layouts {
        #[arg(long)]
        json: bool,
    },

    /// List the available filters and their expressions
    Filters {
        #[arg(long)]
        json: bool,
    },

    /// Parse a filter expression and print the resulting chain
    CheckFilter {
        #[arg()]
        expression: String,
    },

    /// Run a full session: select, capture, finalize and export
    Shoot {
        /// Layout identifier (e.g. "Layout A")
        #[arg(short, long)]
        layout: String,

        /// Filter per capture, in order; the last one repeats
        #[arg(short, long)]
        filter: Vec<String>,

        /// Camera source: synthetic, deny, none or a directory of frames
        #[arg(long, default_value = "synthetic")]
        camera: String,

        /// Caption for layouts that print one
        #[arg(long)]
        caption: Option<String>,

        /// Output directory (default: export.output_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Composite existing images into a layout and export it
    Compose {
        #[arg(short, long)]
        layout: String,

        /// Images to place into the slots, in order
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Filter applied to every image
        #[arg(short, long, default_value = "none")]
        filter: String,

        #[arg(long)]
        caption: Option<String>,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let pipeline = Pipeline::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Layouts { json } => cmd_layouts(&pipeline, json),
        Commands::Filters { json } => cmd_filters(&pipeline, json),
        Commands::CheckFilter { expression } => cmd_check_filter(&expression),
        Commands::Shoot {
            layout,
            filter,
            camera,
            caption,
            out,
        } => run_async(cmd_shoot(pipeline, layout, filter, camera, caption, out)),
        Commands::Compose {
            layout,
            images,
            filter,
            caption,
            out,
        } => run_async(cmd_compose(pipeline, layout, images, filter, caption, out)),
    }
}

fn run_async<F>(future: F) -> Result<()>
where
    F: std::future::Future<Output = Result<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")?;
    runtime.block_on(future)
}

#[derive(Serialize)]
struct LayoutRow<'a> {
    id: &'a str,
    label: &'a str,
    required: usize,
}

fn cmd_layouts(pipeline: &Pipeline, json: bool) -> Result<()> {
    let rows: Vec<LayoutRow> = pipeline
        .layouts
        .iter()
        .map(|l| LayoutRow {
            id: &l.id,
            label: &l.label,
            required: l.required,
        })
        .collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in rows {
        println!("{:<10} {:<12} {} captures", row.id, row.label, row.required);
    }
    Ok(())
}

fn cmd_filters(pipeline: &Pipeline, json: bool) -> Result<()> {
    if json {
        let entries: Vec<_> = pipeline.filters.iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for filter in pipeline.filters.iter() {
        println!("{:<10} {:<14} {}", filter.id, filter.label, filter.expression);
    }
    Ok(())
}

fn cmd_check_filter(expression: &str) -> Result<()> {
    let chain = snapstrip_fx::parse(expression)
        .with_context(|| format!("invalid filter expression: {}", expression))?;
    if chain.is_identity() {
        println!("none");
        return Ok(());
    }
    for (i, op) in chain.ops().iter().enumerate() {
        println!("{:>2}. {}", i + 1, op);
    }
    Ok(())
}

async fn cmd_shoot(
    pipeline: Pipeline,
    layout: String,
    filters: Vec<String>,
    camera: String,
    caption: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut orchestrator = CaptureOrchestrator::new(
        Arc::clone(&pipeline.layouts),
        Arc::clone(&pipeline.filters),
        camera_from_arg(&camera),
        pipeline.config.capture.clone(),
    );
    if !orchestrator.select_layout(&layout) {
        anyhow::bail!("unknown layout '{}'", layout);
    }
    let preview = orchestrator
        .acquire_camera()
        .await
        .with_context(|| format!("could not start camera '{}'", camera))?;
    tracing::info!(width = preview.width, height = preview.height, "camera live");

    let mut shot = 0;
    while !orchestrator.session().is_complete() {
        orchestrator.set_filter(filter_for_shot(&filters, shot));
        match orchestrator.capture().await.context("capture failed")? {
            CaptureOutcome::Stored { index, .. } => {
                println!("   ✓ capture {} ({})", index + 1, orchestrator.session().active_filter);
            }
            CaptureOutcome::Dropped => break,
        }
        shot += 1;
    }
    orchestrator.finalize()?;

    let mut stage = Stage::new();
    let handle = orchestrator.compose(&mut stage)?;
    export(&pipeline.exporter(out), &mut stage, handle, caption.as_deref()).await
}

async fn cmd_compose(
    pipeline: Pipeline,
    layout: String,
    images: Vec<PathBuf>,
    filter: String,
    caption: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let descriptor = pipeline
        .layouts
        .resolve(&layout)
        .with_context(|| format!("unknown layout '{}'", layout))?;
    if images.len() < descriptor.required {
        tracing::warn!(
            layout = %descriptor.id,
            images = images.len(),
            required = descriptor.required,
            "not enough images, remaining slots stay empty"
        );
    }

    let filter = pipeline.filters.resolve(&filter);
    let settings = &pipeline.config.capture;
    let mut captures = Vec::with_capacity(images.len());
    for path in images.iter().take(descriptor.required) {
        let frame = load_image(path)?;
        let native = StreamDimensions::new(frame.width, frame.height);
        let height = derive_preview_height(settings.preview_width, native, settings.fallback_aspect);
        let surface = draw_capture(&frame, settings.preview_width, height, false, &filter.chain)?;
        captures.push(frame_to_data_url(&surface)?);
        println!("   ✓ {} ({})", path.display(), filter.id);
    }

    let mut stage = Stage::new();
    let handle = compose_result_view(descriptor, &captures, &mut stage);
    export(&pipeline.exporter(out), &mut stage, handle, caption.as_deref()).await
}

async fn export(
    exporter: &Exporter,
    stage: &mut Stage,
    handle: SubtreeHandle,
    caption: Option<&str>,
) -> Result<()> {
    if let (Some(caption), Some(root)) = (caption, stage.get_mut(handle)) {
        StripsTemplate::apply_caption(root, caption);
    }
    let report = exporter
        .export(stage, handle)
        .await
        .context("export failed")?;
    println!(
        "   ✓ {} ({}x{}, {})",
        report.path.display(),
        report.width,
        report.height,
        &report.hash.to_hex()[..12]
    );
    Ok(())
}
