// src/gui/log_buffer.rs

/// Bounded text buffer behind the log panel.
///
/// - `\r` moves back to the start of the current line: the next printable
///   character overwrites it, like a terminal rendering a progress bar.
/// - Once `capacity` bytes are exceeded, whole lines are evicted from the
///   front.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    text: String,
    /// Byte offset where the current (last) line starts.
    line_start: usize,
    pending_cr: bool,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            line_start: 0,
            pending_cr: false,
            capacity,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Append raw tool output, which may end mid-line.
    pub fn push_str(&mut self, chunk: &str) {
        for c in chunk.chars() {
            match c {
                '\r' => self.pending_cr = true,
                '\n' => {
                    self.pending_cr = false;
                    self.text.push('\n');
                    self.line_start = self.text.len();
                }
                _ => {
                    if self.pending_cr {
                        self.text.truncate(self.line_start);
                        self.pending_cr = false;
                    }
                    self.text.push(c);
                }
            }
        }
        self.enforce_capacity();
    }

    /// Append a full line, starting a new one first if the buffer currently
    /// ends mid-line.
    pub fn push_line(&mut self, line: &str) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.push_str("\n");
        }
        self.push_str(line);
        self.push_str("\n");
    }

    fn enforce_capacity(&mut self) {
        if self.text.len() <= self.capacity {
            return;
        }

        let mut excess = self.text.len() - self.capacity;
        while !self.text.is_char_boundary(excess) {
            excess += 1;
        }

        let cut = match self.text[excess..].find('\n') {
            Some(i) => excess + i + 1,
            None => excess,
        };

        self.text.drain(..cut);
        self.line_start = self.line_start.saturating_sub(cut);
    }
}
