mod audio;
mod cli;
mod config;

use anyhow::{Context, Result};
use chordify::{AnalyzerConfig, Chord};
use clap::Parser;
use std::path::PathBuf;

use audio::analysis::AnalysisSettings;
use audio::spectrum::SpectrumConfig;
use audio::timeline::OutputFormat;
use cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();
    let mut spectrum = SpectrumConfig::default();

    // Load config: explicit --config path, or auto-detect chordify.toml / global config
    let config_path = cli.config.clone().or_else(find_config);
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.peak_threshold == 120 { cli.peak_threshold = cfg.analysis.peak_threshold; }
            if cli.min_frequency == 60.0 { cli.min_frequency = cfg.analysis.min_frequency; }
            if !cli.no_harmonic_suppression {
                cli.no_harmonic_suppression = !cfg.analysis.harmonic_suppression;
            }
            if cli.fft_size == 16384 { cli.fft_size = cfg.spectrum.fft_size; }
            if cli.format == OutputFormat::Text { cli.format = cfg.output.format; }
            if !cli.changes_only { cli.changes_only = cfg.output.changes_only; }
            spectrum.min_decibels = cfg.spectrum.min_decibels;
            spectrum.max_decibels = cfg.spectrum.max_decibels;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    let analyzer = AnalyzerConfig {
        min_frequency: cli.min_frequency,
        peak_threshold: cli.peak_threshold,
        harmonic_suppression: !cli.no_harmonic_suppression,
    };

    // Direct naming mode
    if !cli.notes.is_empty() {
        let chord = Chord::from_names(&cli.notes).context("Invalid note list")?;
        println!("{}", chord.name());
        return Ok(());
    }

    let input = cli.input.as_ref().context("Input audio file is required")?;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    log::info!("chordify - chord recognition");
    log::info!("Input: {}", input.display());

    // 1. Decode audio
    log::info!("Decoding audio...");
    let audio_data = audio::decode::decode_audio(input)?;

    // 2. Analyze
    let settings = AnalysisSettings {
        bpm: cli.bpm,
        offset: cli.offset,
        analyzer,
        spectrum: SpectrumConfig {
            fft_size: cli.fft_size,
            ..spectrum
        },
    };
    let mut timeline = audio::analysis::analyze(&audio_data, &settings, !cli.quiet)?;
    log::info!("Analyzed {} beats", timeline.frames.len());

    if cli.changes_only {
        timeline = timeline.changes_only();
    }

    // 3. Output
    let rendered = timeline.render(cli.format).context("Failed to serialize chord timeline")?;
    match cli.output {
        Some(ref path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Done! Output: {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("chordify.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("chordify").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("chordify").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
