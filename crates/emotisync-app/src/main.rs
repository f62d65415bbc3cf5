use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use emotisync_client::RecognitionClient;
use emotisync_core::{processor, MediaKind};
use emotisync_media::{Canvas, FileAcquirer, MediaSource};

mod config;
mod controller;
mod notify;
mod store;

use controller::PageController;
use notify::ConsoleNotifier;
use store::JsonFileStore;

#[derive(Parser)]
#[command(name = "emotisync", about = "EmotiSync expression recognition client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a photo or video and write the annotated overlay
    Analyze {
        /// Path to the image or video file
        path: PathBuf,
        /// Only accept a video input
        #[arg(long)]
        video: bool,
        /// Where to write the annotated overlay image
        #[arg(short, long, default_value = "emotisync-overlay.png")]
        out: PathBuf,
        /// Skip the advisory health probe on startup
        #[arg(long)]
        no_health_check: bool,
    },
    /// Probe the recognition service's health endpoint
    Health,
    /// Print the recent usage log
    Logs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = config::Config::from_env();

    match cli.command {
        Commands::Analyze {
            path,
            video,
            out,
            no_health_check,
        } => {
            record_usage_best_effort(&cfg, "analyze");

            let mut canvas = Canvas::new(cfg.canvas_width, cfg.canvas_height);
            if let Some(font_path) = &cfg.font_path {
                canvas = canvas.with_font_file(font_path);
            }

            let client = RecognitionClient::new(cfg.base_url.clone());
            let mut controller =
                PageController::new(client, ConsoleNotifier, canvas, cfg.max_upload_bytes);

            if !no_health_check {
                controller.on_load().await;
            }

            let kinds: &[MediaKind] = if video {
                &[MediaKind::Video]
            } else {
                &[MediaKind::Image, MediaKind::Video]
            };
            let acquirer = FileAcquirer::new(path);

            let rendered = controller
                .handle_capture(&acquirer, kinds, &[MediaSource::Album])
                .await;

            let state = controller.state();
            if state.has_result {
                println!("{}张人脸: {}", state.face_count, state.emotion_summary);
                if let Some(faces) = &state.detection_results {
                    let report = processor::process(faces);
                    for reading in &report.detailed {
                        println!(
                            "  {}. {} {} 置信度 {:.2}",
                            reading.index,
                            reading.display.glyph,
                            reading.display.label,
                            reading.confidence
                        );
                    }
                }
            }

            if let Some(overlay) = rendered {
                overlay.save(&out)?;
                println!("overlay written to {}", out.display());
            }
        }
        Commands::Health => {
            let client = RecognitionClient::new(cfg.base_url.clone());
            let health = client.check_health().await;
            if health.reachable {
                println!("service reachable");
            } else {
                anyhow::bail!("service unreachable\n{}", health.detail);
            }
        }
        Commands::Logs => {
            let kv = JsonFileStore::open(&cfg.store_path)?;
            for entry in store::usage_log(&kv) {
                println!("{}  {}", entry.timestamp.to_rfc3339(), entry.action);
            }
        }
    }

    Ok(())
}

/// Usage logging is auxiliary; a broken store never blocks the pipeline.
fn record_usage_best_effort(cfg: &config::Config, action: &str) {
    match JsonFileStore::open(&cfg.store_path) {
        Ok(mut kv) => {
            if let Err(err) = store::record_usage(&mut kv, action) {
                tracing::warn!(error = %err, "usage log update failed");
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %cfg.store_path.display(), "usage store unavailable");
        }
    }
}
