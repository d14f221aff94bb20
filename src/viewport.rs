/// Visible window of the document. Offsets are in rows and render columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub rowoff: usize,
    pub coloff: usize,
    num_rows: usize,
    num_cols: usize,
}

impl Viewport {
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            rowoff: 0,
            coloff: 0,
            num_rows: num_rows.max(1),
            num_cols: num_cols.max(1),
        }
    }

    pub fn rows(&self) -> usize {
        self.num_rows
    }

    pub fn cols(&self) -> usize {
        self.num_cols
    }

    // Adjust scroll position when cursor is outside screen
    pub fn scroll(&mut self, cy: usize, rx: usize) {
        if cy < self.rowoff {
            // Scroll up when cursor is above the top of window
            self.rowoff = cy;
        }
        if cy >= self.rowoff + self.num_rows {
            // Scroll down when cursor is below the bottom of screen
            self.rowoff = cy - self.num_rows + 1;
        }
        if rx < self.coloff {
            self.coloff = rx;
        }
        if rx >= self.coloff + self.num_cols {
            self.coloff = rx - self.num_cols + 1;
        }
    }

    // Force the next scroll to put the cursor line at the top of the window
    pub fn invalidate_rowoff(&mut self, num_lines: usize) {
        self.rowoff = num_lines + 1;
    }

    /// Cursor position on the screen. Only meaningful after `scroll()` with the same cursor.
    pub fn project(&self, cy: usize, rx: usize) -> (usize, usize) {
        (cy - self.rowoff, rx - self.coloff)
    }

    pub fn file_row(&self, y: usize) -> usize {
        y + self.rowoff
    }

    // Visible slice of the rendered line as range of character indices
    pub fn visible_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.coloff.min(len);
        let end = (self.coloff + self.num_cols).min(len);
        start..end
    }
}
