// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Build a gradient-echo sequence from a JSON description and render it.
//!
//! # Usage
//!
//! ```bash
//! # Per-channel segment counts and time spans
//! mrseq summary protocol.json
//!
//! # Rendered waveforms as JSON
//! mrseq waveforms protocol.json --output waveforms.json
//!
//! # Construction parameters after TE/TR negotiation
//! mrseq parameters protocol.json
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use mrseq_core::{Channel, Node, WaveformRenderer};
use mrseq_log::info;
use mrseq_protocols::{GradientEcho, GradientEchoConfig};

/// Gradient-echo sequence builder
#[derive(Parser, Debug)]
#[command(name = "mrseq")]
#[command(version)]
#[command(about = "Build and render MR pulse sequences")]
struct Cli {
    /// What to print
    #[arg(value_enum)]
    kind: OutputKind,

    /// Path to the JSON protocol description
    config: PathBuf,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log filter (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log per-node build and render details
    #[arg(long)]
    diagnostics: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputKind {
    Waveforms,
    Parameters,
    Summary,
}

fn load_config(path: &Path) -> Result<GradientEchoConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid protocol in '{}'", path.display()))
}

fn summary(ge: &GradientEcho, renderer: &WaveformRenderer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "te: {} ms", ge.te());
    let _ = writeln!(out, "tr: {} ms", ge.tr());
    let _ = writeln!(out, "duration: {} ms", ge.root().dur());
    for channel in Channel::ALL {
        let waveform = renderer.channel(channel);
        let span = match waveform.span() {
            Some((start, end)) => format!("{start} .. {end} ms"),
            None => "empty".to_string(),
        };
        let _ = writeln!(
            out,
            "{}: {} segments, {} points, {}",
            channel.label(),
            waveform.len(),
            waveform.point_count(),
            span
        );
    }
    out
}

fn run(kind: OutputKind, config: &GradientEchoConfig) -> Result<String> {
    let ge = GradientEcho::build(config)?;
    info!("Built gradient echo with te={} ms, tr={} ms", ge.te(), ge.tr());
    match kind {
        OutputKind::Parameters => {
            let record = Node::from(ge.root().clone()).serialize()?;
            Ok(serde_json::to_string_pretty(&record)?)
        }
        OutputKind::Waveforms => {
            let mut renderer = WaveformRenderer::new();
            renderer.run(&ge.node())?;
            Ok(serde_json::to_string(&renderer)?)
        }
        OutputKind::Summary => {
            let mut renderer = WaveformRenderer::new();
            renderer.run(&ge.node())?;
            Ok(summary(&ge, &renderer))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .init();
    mrseq_log::init_logging(cli.diagnostics);

    let config = load_config(&cli.config)?;
    let out = run(cli.kind, &config)?;
    match &cli.output {
        Some(path) => std::fs::write(path, out)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => println!("{out}"),
    }
    Ok(())
}
