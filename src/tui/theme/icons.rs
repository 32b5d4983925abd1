//! Nerd Font icons for TUI display
//! Requires a Nerd Font to be installed (https://www.nerdfonts.com)

/// Icon set using Nerd Font glyphs
#[derive(Debug, Clone)]
pub struct Icons {
    // Playback controls
    pub play: &'static str,
    pub pause: &'static str,
    pub stop: &'static str,
    pub next: &'static str,
    pub prev: &'static str,
    pub waiting: &'static str,

    // Volume
    pub volume_mute: &'static str,
    pub volume_low: &'static str,
    pub volume_high: &'static str,

    // Panes
    pub queue: &'static str,
    pub lyrics: &'static str,
    pub radio: &'static str,
    pub folder: &'static str,

    // Status
    pub success: &'static str,
    pub error: &'static str,
    pub played: &'static str,

    // Progress bar
    pub progress_full: &'static str,
    pub progress_empty: &'static str,
    pub progress_head: &'static str,
}

impl Icons {
    /// Nerd Font icon set
    pub const fn nerd() -> Self {
        Self {
            play: "\u{f04b}",           // nf-fa-play
            pause: "\u{f04c}",          // nf-fa-pause
            stop: "\u{f04d}",           // nf-fa-stop
            next: "\u{f051}",           // nf-fa-step_forward
            prev: "\u{f048}",           // nf-fa-step_backward
            waiting: "\u{f017}",        // nf-fa-clock_o

            volume_mute: "\u{f026}",    // nf-fa-volume_off
            volume_low: "\u{f027}",     // nf-fa-volume_down
            volume_high: "\u{f028}",    // nf-fa-volume_up

            queue: "\u{f03a}",          // nf-fa-list
            lyrics: "\u{f15c}",         // nf-fa-file_text_o
            radio: "\u{f519}",          // nf-md-radio
            folder: "\u{f07b}",         // nf-fa-folder

            success: "\u{f00c}",        // nf-fa-check
            error: "\u{f00d}",          // nf-fa-times
            played: "✓",

            progress_full: "━",
            progress_empty: "─",
            progress_head: "●",
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self::nerd()
    }
}
