//! Time ranges built from parsed cues, and the position -> line lookup that
//! drives the scrolling lyric window.
//!
//! A cue's text is current from its own timestamp until the next cue starts.
//! The sequence is framed by blank padding ranges so the active line can stay
//! centered in a fixed-size window near the start and end of a song.

use super::parser::ParsedLyrics;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// End time of the last real range.
pub const SENTINEL_END: f64 = 9999.99;

/// Start time that marks a padding range.
const PADDING_START: f64 = -1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    /// Exclusive upper bound
    pub end: f64,
    pub text: String,
}

impl TimeRange {
    fn padding() -> Self {
        Self {
            start: PADDING_START,
            end: 0.0,
            text: String::new(),
        }
    }

    pub fn is_padding(&self) -> bool {
        self.start < 0.0
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }
}

/// Emitted when the user activates a lyric line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    pub target: f64,
}

#[derive(Debug, Clone)]
pub struct Timeline {
    ranges: Vec<TimeRange>,
    tags: BTreeMap<String, String>,
    padding: usize,
    cues: usize,
    active: usize,
}

impl Timeline {
    /// A timeline with nothing but padding (no lyrics).
    pub fn empty(padding: usize) -> Self {
        Self::from_parsed(ParsedLyrics::default(), padding)
    }

    pub fn parse(document: &str, padding: usize) -> Self {
        Self::from_parsed(ParsedLyrics::parse(document), padding)
    }

    pub fn from_parsed(parsed: ParsedLyrics, padding: usize) -> Self {
        let cues: Vec<_> = parsed
            .lines
            .into_iter()
            .filter(|l| l.start < SENTINEL_END)
            .collect();

        let mut ranges = Vec::with_capacity(cues.len() + 2 * padding + 1);
        ranges.extend(std::iter::repeat_with(TimeRange::padding).take(padding));

        if !cues.is_empty() {
            let mut start = 0.0;
            let mut text = String::new();
            let count = cues.len();
            for cue in cues {
                ranges.push(TimeRange {
                    start,
                    end: cue.start,
                    text,
                });
                start = cue.start;
                text = cue.text;
            }
            ranges.push(TimeRange {
                start,
                end: SENTINEL_END,
                text,
            });

            ranges.extend(std::iter::repeat_with(TimeRange::padding).take(padding));

            let mut timeline = Self {
                ranges,
                tags: parsed.tags,
                padding,
                cues: count,
                active: 0,
            };
            timeline.move_to(0.0);
            return timeline;
        }

        ranges.extend(std::iter::repeat_with(TimeRange::padding).take(padding));
        Self {
            ranges,
            tags: parsed.tags,
            padding,
            cues: 0,
            active: 0,
        }
    }

    /// Select the range containing `time`. Times no real range contains
    /// (negative, NaN, past the sentinel) leave the active index untouched.
    pub fn move_to(&mut self, time: f64) -> usize {
        let real = self.real_ranges();
        // Real ranges are sorted and contiguous; zero-width ones never match.
        let after = real.partition_point(|r| r.start <= time);
        if after > 0 && real[after - 1].contains(time) {
            self.active = self.padding + after - 1;
        }
        self.active
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_range(&self) -> Option<&TimeRange> {
        self.ranges.get(self.active)
    }

    /// Indices within `context` lines of the active one.
    pub fn visible(&self, context: usize) -> RangeInclusive<usize> {
        let last = self.ranges.len().saturating_sub(1);
        self.active.saturating_sub(context)..=(self.active + context).min(last)
    }

    pub fn is_visible(&self, index: usize, context: usize) -> bool {
        self.visible(context).contains(&index)
    }

    /// Seek target for a user-activated line. Padding slots are inert.
    pub fn activate(&self, index: usize) -> Option<SeekRequest> {
        let range = self.ranges.get(index)?;
        if range.is_padding() {
            return None;
        }
        Some(SeekRequest {
            target: range.start,
        })
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Number of cues parsed from the document (0 means no lyrics).
    pub fn cue_count(&self) -> usize {
        self.cues
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    fn real_ranges(&self) -> &[TimeRange] {
        let end = self.ranges.len() - self.padding;
        &self.ranges[self.padding.min(end)..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "[ti:Demo]\n[00:10.00]A\n[00:20.00]B\n[00:35.00]C\n";

    fn text_at(t: &mut Timeline, time: f64) -> String {
        let i = t.move_to(time);
        t.ranges()[i].text.clone()
    }

    #[test]
    fn test_move_selects_expected_lines() {
        let mut t = Timeline::parse(DOC, 8);
        assert_eq!(text_at(&mut t, 5.0), "");
        assert_eq!(text_at(&mut t, 10.0), "A");
        assert_eq!(text_at(&mut t, 19.999), "A");
        assert_eq!(text_at(&mut t, 20.0), "B");
        assert_eq!(text_at(&mut t, 1000.0), "C");
        assert_eq!(t.active_range().map(|r| r.end), Some(SENTINEL_END));
    }

    #[test]
    fn test_layout_with_padding() {
        let t = Timeline::parse(DOC, 3);
        // 3 padding + pre-roll + 3 cues + 3 padding
        assert_eq!(t.ranges().len(), 10);
        assert!(t.ranges()[..3].iter().all(TimeRange::is_padding));
        assert!(t.ranges()[7..].iter().all(TimeRange::is_padding));
        assert_eq!(t.ranges()[3].start, 0.0);
        assert_eq!(t.ranges()[3].end, 10.0);
        assert_eq!(t.cue_count(), 3);
        assert_eq!(t.tags().get("ti").map(String::as_str), Some("Demo"));
    }

    #[test]
    fn test_fresh_parse_starts_at_time_zero() {
        let t = Timeline::parse(DOC, 8);
        assert_eq!(t.active(), 8);
        assert_eq!(t.active_range().map(|r| r.text.as_str()), Some(""));
    }

    #[test]
    fn test_real_ranges_are_contiguous_and_cover_timeline() {
        let doc = "[00:03.10]x\n[00:01.00]y\n[00:01.00]z\n[02:00.00]w\nnoise\n[00:59.99]v";
        let t = Timeline::parse(doc, 4);
        let real: Vec<_> = t.ranges().iter().filter(|r| !r.is_padding()).collect();
        assert_eq!(real.first().map(|r| r.start), Some(0.0));
        assert_eq!(real.last().map(|r| r.end), Some(SENTINEL_END));
        for pair in real.windows(2) {
            assert!(pair[0].start <= pair[1].start);
            assert_eq!(pair[0].end, pair[1].start);
        }
        for r in &real {
            assert!(r.start <= r.end);
        }
    }

    #[test]
    fn test_out_of_range_move_keeps_previous_line() {
        let mut t = Timeline::parse(DOC, 2);
        let at_a = t.move_to(12.0);
        assert_eq!(t.move_to(-3.0), at_a);
        assert_eq!(t.move_to(f64::NAN), at_a);
        assert_eq!(t.move_to(SENTINEL_END + 1.0), at_a);
    }

    #[test]
    fn test_empty_document_is_padding_only() {
        let mut t = Timeline::parse("", 8);
        assert_eq!(t.ranges().len(), 16);
        assert!(t.ranges().iter().all(TimeRange::is_padding));
        assert_eq!(t.move_to(42.0), 0);
        assert!(t.activate(0).is_none());

        let garbage = Timeline::parse("just words\n[what]\n", 2);
        assert_eq!(garbage.ranges().len(), 4);
        assert_eq!(garbage.cue_count(), 0);
    }

    #[test]
    fn test_zero_padding() {
        let mut t = Timeline::parse(DOC, 0);
        assert_eq!(t.ranges().len(), 4);
        assert_eq!(text_at(&mut t, 36.0), "C");
        assert!(Timeline::empty(0).ranges().is_empty());
    }

    #[test]
    fn test_activate_reports_range_start() {
        let t = Timeline::parse(DOC, 2);
        // index 2 = pre-roll, 3 = "A"
        assert_eq!(t.activate(3), Some(SeekRequest { target: 10.0 }));
        assert_eq!(t.activate(2), Some(SeekRequest { target: 0.0 }));
        assert_eq!(t.activate(0), None);
        assert_eq!(t.activate(t.ranges().len() - 1), None);
        assert_eq!(t.activate(99), None);
    }

    #[test]
    fn test_visible_window_is_clamped() {
        let mut t = Timeline::parse(DOC, 2);
        t.move_to(0.0);
        assert_eq!(t.visible(2), 0..=4);
        assert!(t.is_visible(0, 2));
        assert!(!t.is_visible(5, 2));
        t.move_to(500.0);
        let last = t.ranges().len() - 1;
        assert_eq!(t.active(), 5);
        assert_eq!(t.visible(8), 0..=last);
    }

    #[test]
    fn test_reparse_replaces_state() {
        let mut t = Timeline::parse(DOC, 1);
        t.move_to(40.0);
        t = Timeline::parse("[00:01.00]only", 1);
        assert_eq!(t.cue_count(), 1);
        assert_eq!(t.active(), 1);
        assert_eq!(text_at(&mut t, 2.0), "only");
    }
}
