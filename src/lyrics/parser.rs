//! LRC format parser
//!
//! Parses synchronized lyrics in LRC format:
//! [mm:ss.xx] Lyrics line here
//!
//! Example:
//! [ti:Song Title]
//! [00:12.34] Hello world
//! [00:15.00][01:15.00] Chorus shown twice

use std::collections::BTreeMap;

/// A single cue: one timestamp and the text shown from it on
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Seconds from the start of the track
    pub start: f64,
    /// The lyrics text
    pub text: String,
}

impl LyricLine {
    pub fn new(start: f64, text: String) -> Self {
        Self { start, text }
    }
}

/// Cues and metadata tags extracted from one LRC document
#[derive(Debug, Clone, Default)]
pub struct ParsedLyrics {
    /// Cues sorted by start time (ties keep document order)
    pub lines: Vec<LyricLine>,
    /// Metadata tags like `ti`, `ar`, `al`, `offset`
    pub tags: BTreeMap<String, String>,
}

impl ParsedLyrics {
    /// Parse LRC formatted lyrics. Malformed lines are skipped, never fatal.
    pub fn parse(content: &str) -> Self {
        let mut parsed = Self::default();

        // A lone '\r' ends a line too
        for line in content.split(['\r', '\n']) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Metadata tags like [ti:Title]
            if let Some((key, value)) = Self::parse_metadata(line) {
                parsed.tags.insert(key, value);
                continue;
            }

            // Timestamped line like [00:12.34]Lyrics
            if let Some(cues) = Self::parse_timed_line(line) {
                parsed.lines.extend(cues);
            }
        }

        // Vec::sort_by is stable, duplicates keep source order
        parsed.lines.sort_by(|a, b| a.start.total_cmp(&b.start));

        parsed
    }

    /// Parse metadata tag like [ti:Title]
    fn parse_metadata(line: &str) -> Option<(String, String)> {
        let rest = line.strip_prefix('[')?;
        let end = rest.find(']')?;
        let tag_content = &rest[..end];

        let colon_pos = tag_content.find(':')?;
        let key = &tag_content[..colon_pos];

        if !key.is_empty() && key.chars().all(|c| c.is_ascii_lowercase()) {
            let value = tag_content[colon_pos + 1..].trim().to_string();
            return Some((key.to_string(), value));
        }

        None
    }

    /// Parse a timed line like [00:12.34]Lyrics or [00:12.34][00:15.00]Lyrics
    fn parse_timed_line(line: &str) -> Option<Vec<LyricLine>> {
        let mut timestamps = Vec::new();
        let mut saw_time_tag = false;
        let mut pos = 0;

        // Extract all timestamp tags at the beginning
        while line[pos..].starts_with('[') {
            let Some(end) = line[pos..].find(']') else {
                break;
            };
            let tag = &line[pos + 1..pos + end];
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ':') {
                break;
            }
            saw_time_tag = true;
            if let Some(secs) = Self::parse_timestamp(tag) {
                timestamps.push(secs);
            }
            pos += end + 1;
        }

        if !saw_time_tag || timestamps.is_empty() {
            return None;
        }

        let text = line[pos..].trim().to_string();

        // One cue per timestamp
        let lines = timestamps
            .into_iter()
            .map(|ts| LyricLine::new(ts, text.clone()))
            .collect();

        Some(lines)
    }

    /// Parse timestamp string like "01:02.50" into seconds
    pub(crate) fn parse_timestamp(s: &str) -> Option<f64> {
        let (min, sec) = s.split_once(':')?;
        if min.is_empty() || !min.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        // "01:.5" is half a second past the minute
        let digits = sec.strip_prefix('.').unwrap_or(sec);
        if !digits.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let min: u32 = min.parse().ok()?;
        let sec: f64 = sec.parse().ok()?;
        if !sec.is_finite() {
            return None;
        }
        Some(f64::from(min) * 60.0 + sec)
    }
}
