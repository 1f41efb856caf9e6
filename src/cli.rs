use clap::Parser;
use std::path::PathBuf;

use crate::audio::timeline::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "chordify", about = "Names the chords heard in an audio file, beat by beat")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
    pub input: Option<PathBuf>,

    /// Config file (default: ./chordify.toml, then the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Name the chord formed by these pitches (e.g. C3,E3,G3) and exit
    #[arg(long, value_delimiter = ',')]
    pub notes: Vec<String>,

    /// Tempo in BPM. Estimated from the audio when omitted.
    #[arg(long)]
    pub bpm: Option<f32>,

    /// Time of the first beat in seconds. Defaults to the first detected onset.
    #[arg(long)]
    pub offset: Option<f32>,

    /// Minimum byte magnitude (0-255) of a spectral peak
    #[arg(long, default_value_t = 120)]
    pub peak_threshold: u8,

    /// Lowest frequency in Hz considered for peaks
    #[arg(long, default_value_t = 60.0)]
    pub min_frequency: f64,

    /// Keep overtones instead of attenuating them
    #[arg(long)]
    pub no_harmonic_suppression: bool,

    /// FFT window size in samples
    #[arg(long, default_value_t = 16384)]
    pub fft_size: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Only print beats where the chord changes
    #[arg(long)]
    pub changes_only: bool,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_analysis_defaults() {
        let cli = Cli::parse_from(["chordify", "song.wav"]);
        assert_eq!(cli.input, Some(PathBuf::from("song.wav")));
        assert_eq!(cli.peak_threshold, 120);
        assert_eq!(cli.min_frequency, 60.0);
        assert!(!cli.no_harmonic_suppression);
        assert_eq!(cli.fft_size, 16384);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.notes.is_empty());
    }

    #[test]
    fn parses_note_list_and_overrides() {
        let cli = Cli::parse_from([
            "chordify",
            "--notes",
            "C3,E3,G3",
            "--bpm",
            "90",
            "--format",
            "json",
            "--no-harmonic-suppression",
        ]);
        assert_eq!(cli.notes, vec!["C3", "E3", "G3"]);
        assert_eq!(cli.bpm, Some(90.0));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.no_harmonic_suppression);
        assert!(cli.input.is_none());
    }
}
