use crate::text_buffer::TextBuffer;

#[derive(Default, Debug, PartialEq)]
pub struct StatusBar {
    pub modified: bool,
    pub filename: String,
    pub filetype: Option<&'static str>,
    // (cursor line, number of lines)
    pub line_pos: (usize, usize),
}

impl StatusBar {
    pub fn from_buf(buf: &TextBuffer) -> Self {
        Self {
            modified: buf.dirty(),
            filename: buf.filename().to_string(),
            filetype: buf.filetype(),
            line_pos: (buf.cy() + 1, buf.rows().len()),
        }
    }

    pub fn left(&self) -> String {
        let name: String = self.filename.chars().take(20).collect();
        format!(
            "{} - {} lines {}",
            name,
            self.line_pos.1,
            if self.modified { "(modified)" } else { "" }
        )
    }

    pub fn right(&self) -> String {
        let (y, len) = self.line_pos;
        format!("{} {}/{}", self.filetype.unwrap_or("no ft"), y, len)
    }

    // Left part is clipped to the width. Right part is shown only when it fits entirely.
    pub fn layout(&self, width: usize) -> String {
        let mut line: String = self.left().chars().take(width).collect();
        let right = self.right();
        let used = line.chars().count();
        let rest = width - used;
        if right.len() <= rest {
            line.extend(std::iter::repeat(' ').take(rest - right.len()));
            line.push_str(&right);
        } else {
            line.extend(std::iter::repeat(' ').take(rest));
        }
        line
    }
}
