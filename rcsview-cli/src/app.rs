use rcsview::{HostMessage, Notice, PreviewSurface};

/// Input mode for the main loop.
#[derive(PartialEq, Eq)]
pub enum Mode {
    Normal,
    EditCredential,
}

pub struct App {
    pub surface: PreviewSurface,
    pub mode: Mode,
    /// Keyboard focus within the candidate file row.
    pub file_cursor: usize,
    /// Credential input buffer while editing.
    pub input: String,
    /// Latest host notice — shown on the status line until replaced.
    pub notice: Option<Notice>,
    /// Spinner frame counter.
    pub tick: usize,
}

impl App {
    pub fn new(surface: PreviewSurface) -> Self {
        Self {
            surface,
            mode: Mode::Normal,
            file_cursor: 0,
            input: String::new(),
            notice: None,
            tick: 0,
        }
    }

    /// Apply a host envelope and keep the file focus in bounds when the
    /// candidate list shrinks.
    pub fn handle_host_message(&mut self, msg: HostMessage) {
        self.surface.handle_message(msg);
        let len = self.surface.candidates().len();
        if len == 0 {
            self.file_cursor = 0;
        } else if self.file_cursor >= len {
            self.file_cursor = len - 1;
        }
    }

    pub fn focus_next_file(&mut self) {
        let len = self.surface.candidates().len();
        if len > 0 {
            self.file_cursor = (self.file_cursor + 1) % len;
        }
    }

    pub fn focus_prev_file(&mut self) {
        let len = self.surface.candidates().len();
        if len > 0 {
            self.file_cursor = if self.file_cursor == 0 {
                len - 1
            } else {
                self.file_cursor - 1
            };
        }
    }

    /// View the focused candidate file.
    pub fn open_focused(&mut self) {
        if let Some(path) = self.surface.candidates().get(self.file_cursor) {
            let path = path.clone();
            self.surface.select_file(path);
        }
    }

    pub fn begin_credential_edit(&mut self) {
        self.mode = Mode::EditCredential;
        self.input.clear();
    }

    pub fn commit_credential(&mut self) {
        let value = std::mem::take(&mut self.input);
        self.surface.set_credential(value);
        self.mode = Mode::Normal;
    }

    pub fn cancel_credential_edit(&mut self) {
        self.input.clear();
        self.mode = Mode::Normal;
    }
}
