//! WebVTT transcript parsing.
//!
//! Teams transcripts arrive as WebVTT with one `<v Speaker>text</v>` cue per
//! timestamp block. Parsing is best effort: anything that does not look like
//! cue text is dropped, nothing is ever reported as an error.

use regex::Regex;
use std::sync::OnceLock;

const HEADER: &str = "WEBVTT";
const COMMENT_PREFIX: &str = "NOTE";
const ARROW: &str = " --> ";

/// One speaker-attributed caption line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionCue {
    pub speaker: String,
    pub text: String,
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}:\d{2}:\d{2}").unwrap())
}

fn voice_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<v\s+([^>]+)>\s*([^<]*)\s*</v>").unwrap())
}

fn is_timing_line(line: &str) -> bool {
    timestamp_re().is_match(line) || line.contains(ARROW)
}

/// Extracts `(speaker, text)` from a voice tag. A tag with blank text yields `None`.
fn voice_cue(line: &str) -> Option<Option<CaptionCue>> {
    let caps = voice_re().captures(line)?;
    let speaker = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    if text.is_empty() {
        return Some(None);
    }
    Some(Some(CaptionCue {
        speaker: speaker.to_string(),
        text: text.to_string(),
    }))
}

/// Converts a WebVTT payload into newline-separated `Speaker: text` lines.
///
/// Cue bodies without a voice tag are kept verbatim, except `NOTE` comments.
/// Each timestamp line opens a cue for exactly one following line; lines that
/// are neither cue bodies nor voice-tagged (cue identifiers, stray text) are dropped.
pub fn parse_to_text(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut in_cue = false;

    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if line.to_ascii_uppercase().starts_with(HEADER) {
            continue;
        }
        if is_timing_line(line) {
            in_cue = true;
            continue;
        }

        if in_cue || line.contains("<v ") {
            match voice_cue(line) {
                Some(Some(cue)) => parts.push(format!("{}: {}", cue.speaker, cue.text)),
                Some(None) => {}
                None => {
                    if !line.starts_with(COMMENT_PREFIX) {
                        parts.push(line.to_string());
                    }
                }
            }
        }
        in_cue = false;
    }

    parts.join("\n").trim().to_string()
}

/// Returns only the voice-tagged cues of a WebVTT payload, in source order.
pub fn parse_to_segments(raw: &str) -> Vec<CaptionCue> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    raw.lines()
        .map(str::trim)
        .filter_map(|line| voice_cue(line).flatten())
        .collect()
}
