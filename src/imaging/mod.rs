//! Product photography: resize, square main image, padded detail images,
//! watermark and directory batches. All output is JPEG.

pub mod ops;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::telemetry::ops::image::Phase as ImagePhase;
use crate::telemetry::{self};
use ops::{BatchOp, WatermarkFont};

#[derive(Args, Debug)]
pub struct ImageCmd {
    #[command(subcommand)]
    pub action: ImageAction,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum BatchKind {
    #[value(name = "main")] Main,
    #[value(name = "detail")] Detail,
    #[value(name = "resize")] Resize,
    #[value(name = "watermark")] Watermark,
}

#[derive(Subcommand, Debug)]
pub enum ImageAction {
    /// Resize one image to exact dimensions
    Resize {
        input: PathBuf,
        #[arg(long)] width: u32,
        #[arg(long)] height: u32,
        /// Defaults to `{stem}_resized.jpg` next to the input
        #[arg(long, short)] output: Option<PathBuf>,
    },
    /// 1000x1000 white-backed main image from the first input
    Main {
        #[arg(required = true)] inputs: Vec<PathBuf>,
        #[arg(long, short)] output: PathBuf,
    },
    /// 1500x1500 white-padded detail images, detail_{n}.jpg
    Detail {
        #[arg(required = true)] inputs: Vec<PathBuf>,
        #[arg(long)] output_dir: PathBuf,
    },
    /// Text watermark in the bottom-right corner
    Watermark {
        input: PathBuf,
        #[arg(long)] text: String,
        #[arg(long, short)] output: Option<PathBuf>,
        /// TrueType font; overrides LISTING_WATERMARK_FONT and system lookup
        #[arg(long)] font: Option<PathBuf>,
    },
    /// Process every .jpg/.jpeg/.png/.bmp/.tiff in a directory
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        #[arg(long, value_enum, default_value_t = BatchKind::Detail)] kind: BatchKind,
        #[arg(long, default_value_t = 1000)] width: u32,
        #[arg(long, default_value_t = 1000)] height: u32,
        #[arg(long, default_value = "")] text: String,
    },
}

impl ImageAction {
    fn name(&self) -> &'static str {
        match self {
            ImageAction::Resize { .. } => "resize",
            ImageAction::Main { .. } => "main",
            ImageAction::Detail { .. } => "detail",
            ImageAction::Watermark { .. } => "watermark",
            ImageAction::Batch { .. } => "batch",
        }
    }
}

#[derive(Serialize)]
struct ImageResult {
    action: &'static str,
    outputs: Vec<String>,
}

pub async fn run(args: ImageCmd) -> Result<()> {
    let log = telemetry::image();
    let action = args.action.name();
    let _g = log.root_span_kv([("action", action.to_string())]).entered();

    let font = {
        let _s = log.span(&ImagePhase::Load).entered();
        match &args.action {
            ImageAction::Watermark { font: Some(path), .. } => Some(WatermarkFont::from_file(path)?),
            ImageAction::Watermark { .. } => Some(WatermarkFont::discover()?),
            _ => None,
        }
    };
    if let Some(f) = &font {
        log.info_kv("🔤 watermark font", [("path", f.source.display().to_string())]);
    }

    let outputs = {
        let _s = log.span(&ImagePhase::Transform).entered();
        // decode/resample/encode is CPU bound
        tokio::task::spawn_blocking(move || apply(args.action, font.as_ref()))
            .await
            .context("image task panicked")??
    };

    let _s = log.span(&ImagePhase::Output).entered();
    log.info(format!("🖼️  {} image(s) written", outputs.len()));
    for p in &outputs {
        log.info(format!("   {}", p.display()));
    }
    let result = ImageResult { action, outputs: outputs.iter().map(|p| p.display().to_string()).collect() };
    log.result(&result)?;
    Ok(())
}

fn apply(action: ImageAction, font: Option<&WatermarkFont>) -> Result<Vec<PathBuf>> {
    match action {
        ImageAction::Resize { input, width, height, output } => {
            Ok(vec![ops::resize_image(&input, width, height, output.as_deref())?])
        }
        ImageAction::Main { inputs, output } => Ok(vec![ops::create_main_image(&inputs, &output)?]),
        ImageAction::Detail { inputs, output_dir } => ops::create_detail_images(&inputs, &output_dir),
        ImageAction::Watermark { input, text, output, .. } => {
            let font = font.context("watermark font not loaded")?;
            Ok(vec![ops::add_watermark(&input, &text, output.as_deref(), font)?])
        }
        ImageAction::Batch { input_dir, output_dir, kind, width, height, text } => {
            let op = match kind {
                BatchKind::Main => BatchOp::Main,
                BatchKind::Detail => BatchOp::Detail,
                BatchKind::Resize => BatchOp::Resize { width, height },
                BatchKind::Watermark => BatchOp::Watermark { text },
            };
            ops::batch_process(&input_dir, &output_dir, &op)
        }
    }
}
