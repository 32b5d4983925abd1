#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Resize,

    TogglePause,
    Stop,
    PlayNext,
    PlayPrev,
    /// Seek by a relative amount of seconds
    SeekRelative(f64),
    VolumeUp,
    VolumeDown,
    /// Scan the source more often
    PollFaster,
    PollSlower,

    // Folder prompt
    EditFolder,
    InputChar(char),
    Backspace,
    ClearInput,
    SubmitFolder,
    CancelInput,

    SwitchFocus,
    ListUp,
    ListDown,
    /// Enter on the focused pane
    Activate,

    // Mouse
    PlayIndex(usize),
    SeekLine(usize),
}
