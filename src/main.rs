use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use speech_coach::audio::codec;
use speech_coach::viz::{render, RenderRequest};
use speech_coach::{
    analyze, generate_feedback, AudioFile, Config, Transcription, Viewport, VisualizationKind,
};

/// Inspect a recording and preview coaching output from the terminal.
#[derive(Parser, Debug)]
#[command(name = "speech-coach", about = "Speech delivery coaching core demo")]
struct Cli {
    /// WAV file to inspect.
    wav: Option<PathBuf>,

    /// Visualization kind (waveform, frequency, volume, spectrogram).
    #[arg(long, default_value = "waveform")]
    visualize: String,

    /// Config file name without extension, e.g. config/speech-coach.
    #[arg(long)]
    config: Option<String>,

    /// Transcription JSON to analyze into metrics and feedback.
    #[arg(long)]
    transcript: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    info!("speech-coach v0.1.0");

    if let Some(path) = &cli.wav {
        let audio = AudioFile::open(path)?;
        info!("Duration: {:.1} seconds", audio.duration_seconds);
        info!("Sample rate: {} Hz", audio.sample_rate);
        info!("Channels: {}", audio.channels);

        let kind = VisualizationKind::from_name(&cli.visualize)?;
        let levels = codec::levels(&audio.samples);
        let ops = render(&RenderRequest {
            samples: &levels,
            viewport: Viewport {
                width: 800.0,
                height: 240.0,
            },
            kind,
            tier: cfg.visualization.quality_tier(),
            device: cfg.visualization.device.as_ref(),
            visible: true,
        });
        info!("Rendered {} draw ops for '{}'", ops.len(), cli.visualize);
    }

    if let Some(path) = &cli.transcript {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcription: {}", path.display()))?;
        let transcription: Transcription =
            serde_json::from_str(&raw).context("Failed to parse transcription JSON")?;

        let metrics = analyze(&transcription, &cfg.metrics.to_metrics_config());
        let feedback = generate_feedback(&metrics);

        println!("{}", serde_json::to_string_pretty(&metrics)?);
        for line in feedback
            .positives
            .iter()
            .chain(&feedback.improvements)
            .chain(&feedback.suggestions)
        {
            println!("- {}", line);
        }
        println!("{}", feedback.encouragement);
    }

    if cli.wav.is_none() && cli.transcript.is_none() {
        info!("Nothing to do. Pass a WAV file and/or --transcript <json>.");
    }

    Ok(())
}
