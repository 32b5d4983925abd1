//! Growing playback queue and the playback decisions around it.
//!
//! The queue only ever grows: tracks are appended as discovery finds them,
//! merged on rediscovery and kept sorted oldest first. Every transition
//! returns the [`Command`]s the host has to carry out, so the controller runs
//! without any media backend attached.

use crate::discovery::TrackDescriptor;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Identity key (stable path)
    pub key: String,
    pub media_url: String,
    pub lyric_url: Option<String>,
    pub display_name: String,
    pub modified: f64,
}

impl From<TrackDescriptor> for Track {
    fn from(d: TrackDescriptor) -> Self {
        let display_name = display_name(&d.filename);
        Self {
            key: d.path,
            media_url: d.url,
            lyric_url: d.lrc_url,
            display_name,
            modified: d.mtime,
        }
    }
}

/// Filename without its extension
pub fn display_name(filename: &str) -> String {
    match filename.rfind('.') {
        Some(i) if i > 0 => filename[..i].to_string(),
        _ => filename.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    /// Ran off the end of the queue, waiting for discovery
    Waiting,
}

/// Work for the host's media transport and UI
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load { key: String, media_url: String },
    LoadLyrics { key: String, url: Option<String> },
    Play,
    Pause,
    Seek(f64),
    /// Call [`QueueController::skip_due`] with `token` after `after`
    ScheduleSkip { token: u64, after: Duration },
    Status(String),
}

#[derive(Debug, Clone)]
pub struct QueueController {
    tracks: Vec<Track>,
    known: HashSet<String>,
    /// Key of the track under the cursor; survives re-sorting
    current: Option<String>,
    state: PlaybackState,
    user_stopped: bool,
    transport_active: bool,
    skip_token: u64,
    skip_delay: Duration,
}

impl Default for QueueController {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl QueueController {
    pub fn new(skip_delay: Duration) -> Self {
        Self {
            tracks: Vec::new(),
            known: HashSet::new(),
            current: None,
            state: PlaybackState::Idle,
            user_stopped: false,
            transport_active: false,
            skip_token: 0,
            skip_delay,
        }
    }

    /// Merge a scan into the queue. Returns how many tracks were new.
    pub fn discover(&mut self, items: Vec<TrackDescriptor>) -> usize {
        self.merge(items).0
    }

    /// Merge a scan and decide whether to start one of the new tracks.
    pub fn apply_discovery(&mut self, items: Vec<TrackDescriptor>) -> Vec<Command> {
        let (appended, new_keys, mut commands) = self.merge(items);
        if appended == 0 {
            commands.push(Command::Status(format!("Polling... {} track(s)", self.len())));
            return commands;
        }

        tracing::debug!(appended, total = self.len(), "discovered tracks");
        commands.push(Command::Status(format!("+{appended} new - {} total", self.len())));
        commands.extend(self.autoplay(appended, &new_keys));
        commands
    }

    fn merge(&mut self, items: Vec<TrackDescriptor>) -> (usize, HashSet<String>, Vec<Command>) {
        let mut new_keys = HashSet::new();
        let mut commands = Vec::new();

        for item in items {
            let track = Track::from(item);
            if self.known.insert(track.key.clone()) {
                new_keys.insert(track.key.clone());
                self.tracks.push(track);
                continue;
            }
            let Some(existing) = self.tracks.iter_mut().find(|t| t.key == track.key) else {
                continue;
            };
            let lyrics_changed = existing.lyric_url != track.lyric_url;
            existing.media_url = track.media_url;
            existing.display_name = track.display_name;
            existing.lyric_url = track.lyric_url;
            if lyrics_changed && self.current.as_deref() == Some(existing.key.as_str()) {
                commands.push(Command::LoadLyrics {
                    key: existing.key.clone(),
                    url: existing.lyric_url.clone(),
                });
            }
        }

        // Stable: equal mtimes keep discovery order.
        self.tracks.sort_by(|a, b| a.modified.total_cmp(&b.modified));
        (new_keys.len(), new_keys, commands)
    }

    /// Start the earliest new track after the cursor if the player had caught
    /// up with the tail, is not playing and was not stopped by the user.
    fn autoplay(&mut self, appended: usize, new_keys: &HashSet<String>) -> Vec<Command> {
        if self.user_stopped || self.transport_active {
            return Vec::new();
        }

        let cursor = self.current_index();
        let at_end = match cursor {
            None => true,
            Some(i) => i + appended + 1 >= self.len(),
        };
        if !at_end {
            return Vec::new();
        }

        let from = cursor.map_or(0, |i| i + 1);
        let target = (from..self.len()).find(|&i| new_keys.contains(&self.tracks[i].key));
        match target {
            Some(i) => {
                tracing::info!(index = i, "autoplay");
                self.play_index(i)
            }
            None => Vec::new(),
        }
    }

    /// Start the track at `index`. Out of range is a no-op.
    pub fn play_index(&mut self, index: usize) -> Vec<Command> {
        let Some(track) = self.tracks.get(index) else {
            return Vec::new();
        };
        let key = track.key.clone();
        let commands = vec![
            Command::Load {
                key: key.clone(),
                media_url: track.media_url.clone(),
            },
            Command::LoadLyrics {
                key: key.clone(),
                url: track.lyric_url.clone(),
            },
            Command::Play,
            Command::Status(format!("Playing {}", track.display_name)),
        ];

        self.user_stopped = false;
        self.current = Some(key);
        self.state = PlaybackState::Playing;
        self.transport_active = true;
        // Any pending error skip belongs to the previous track.
        self.skip_token += 1;
        commands
    }

    /// User skip. At the tail this does nothing and the current track keeps playing.
    pub fn next(&mut self) -> Vec<Command> {
        match self.current_index() {
            Some(i) if i + 1 < self.len() => self.play_index(i + 1),
            None if !self.is_empty() => self.play_index(0),
            _ => Vec::new(),
        }
    }

    /// Move past a track the transport has finished with, or wait for more.
    fn advance(&mut self) -> Vec<Command> {
        let commands = self.next();
        if !commands.is_empty() {
            return commands;
        }
        self.state = PlaybackState::Waiting;
        self.transport_active = false;
        vec![Command::Status("Waiting for next track...".to_string())]
    }

    pub fn previous(&mut self) -> Vec<Command> {
        match self.current_index() {
            Some(i) if i > 0 => self.play_index(i - 1),
            _ => Vec::new(),
        }
    }

    /// Pause and rewind, keeping the cursor and the loaded media.
    pub fn stop(&mut self) -> Vec<Command> {
        self.user_stopped = true;
        self.transport_active = false;
        self.skip_token += 1;
        if self.current.is_some() {
            self.state = PlaybackState::Paused;
        }
        vec![
            Command::Pause,
            Command::Seek(0.0),
            Command::Status("Stopped - press play to resume".to_string()),
        ]
    }

    pub fn resume(&mut self) -> Vec<Command> {
        self.user_stopped = false;
        // The transport unloads a finished track, so waiting means reload.
        if self.state == PlaybackState::Waiting
            && let Some(i) = self.current_index()
        {
            return self.play_index(i);
        }
        if self.current_index().is_some() {
            self.state = PlaybackState::Playing;
            self.transport_active = true;
            return vec![Command::Play];
        }
        if self.is_empty() {
            return Vec::new();
        }
        self.play_index(0)
    }

    pub fn toggle_play_pause(&mut self) -> Vec<Command> {
        if self.transport_active {
            self.transport_active = false;
            self.state = PlaybackState::Paused;
            return vec![Command::Pause];
        }
        self.resume()
    }

    /// Transport reached the end of the current track.
    pub fn track_finished(&mut self) -> Vec<Command> {
        self.transport_active = false;
        self.advance()
    }

    /// Transport failed on the current track: skip it after a short delay.
    pub fn track_failed(&mut self, message: &str) -> Vec<Command> {
        tracing::warn!(error = message, track = ?self.current, "media error, skipping");
        self.transport_active = false;
        self.skip_token += 1;
        vec![
            Command::Status("Audio error - skipping".to_string()),
            Command::ScheduleSkip {
                token: self.skip_token,
                after: self.skip_delay,
            },
        ]
    }

    /// A scheduled skip fired. Ignored if anything moved the cursor since.
    pub fn skip_due(&mut self, token: u64) -> Vec<Command> {
        if token != self.skip_token {
            return Vec::new();
        }
        self.advance()
    }

    /// Transport reports playback running. Ignored while nothing is loaded.
    pub fn transport_started(&mut self) {
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            self.transport_active = true;
            self.state = PlaybackState::Playing;
        }
    }

    pub fn transport_paused(&mut self) {
        self.transport_active = false;
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Forget everything, as when the discovery target changes.
    pub fn reset(&mut self) -> Vec<Command> {
        let skip_token = self.skip_token + 1;
        *self = Self::new(self.skip_delay);
        self.skip_token = skip_token;
        vec![Command::Pause]
    }

    pub fn current_index(&self) -> Option<usize> {
        let key = self.current.as_deref()?;
        self.tracks.iter().position(|t| t.key == key)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index().map(|i| &self.tracks[i])
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.user_stopped
    }

    pub fn is_transport_active(&self) -> bool {
        self.transport_active
    }
}
