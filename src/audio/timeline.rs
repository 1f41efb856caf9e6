use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Chord heard at one analysed beat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordFrame {
    pub beat: usize,
    /// Start of the analysed window, in seconds.
    pub time: f32,
    pub chord: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordTimeline {
    pub tempo_bpm: f32,
    pub offset: f32,
    pub duration: f32,
    pub frames: Vec<ChordFrame>,
}

impl ChordTimeline {
    /// Drops every frame whose chord name equals the previous kept frame's.
    pub fn changes_only(mut self) -> Self {
        self.frames.dedup_by(|next, kept| next.chord == kept.chord);
        self
    }

    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => serde_json::to_string_pretty(self),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "# {:.1} BPM, offset {:.2}s, {:.1}s",
            self.tempo_bpm, self.offset, self.duration
        );
        for frame in &self.frames {
            let chord = if frame.chord.is_empty() { "-" } else { frame.chord.as_str() };
            let _ = writeln!(
                out,
                "{:>5}  {}  {:<14} {}",
                frame.beat,
                format_time(frame.time),
                chord,
                frame.notes.join(" ")
            );
        }
        out
    }
}

/// `mm:ss.cc`, or `hh:mm:ss.cc` past the hour.
fn format_time(seconds: f32) -> String {
    let seconds = seconds.max(0.0);
    let total_secs = seconds as u64;
    let centis = ((seconds - total_secs as f32) * 100.0) as u64;
    if total_secs >= 3600 {
        format!(
            "{:02}:{:02}:{:02}.{:02}",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60,
            centis
        )
    } else {
        format!("{:02}:{:02}.{:02}", total_secs / 60, total_secs % 60, centis)
    }
}
