use crate::error::{Error, Result};
use crate::highlight::Highlight;
use crate::render::RenderModel;
use crate::row::Row;
use crate::syntax::{SyntaxRegistry, SyntaxRule};
use std::cmp;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::slice;
use tracing::{debug, info, warn};

/// Read lines of a file. Trailing '\n' and '\r' are stripped from each line. A line which is not
/// valid UTF-8 is an error.
pub fn load_lines<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    BufReader::new(File::open(path)?)
        .split(b'\n')
        .map(|line| {
            let mut line = line?;
            while line.last() == Some(&b'\r') {
                line.pop();
            }
            String::from_utf8(line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        })
        .collect()
}

/// Write whole content to the file, truncating it. Returns the number of bytes written.
pub fn save_content<P: AsRef<Path>>(path: P, content: &str) -> io::Result<usize> {
    let mut f = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?;
    let bytes = content.as_bytes();
    f.set_len(bytes.len() as u64)?;
    f.write_all(bytes)?;
    f.flush()?;
    Ok(bytes.len())
}

// Contain both actual path sequence and display string
pub struct FilePath {
    pub path: PathBuf,
    pub display: String,
}

impl FilePath {
    fn from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        FilePath {
            path: PathBuf::from(path),
            display: path.to_string_lossy().to_string(),
        }
    }

    fn from_string<S: Into<String>>(s: S) -> Self {
        let display = s.into();
        FilePath {
            path: PathBuf::from(&display),
            display,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CursorDir {
    Left,
    Right,
    Up,
    Down,
}

pub struct Lines<'a>(slice::Iter<'a, Row>);

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|r| r.buffer())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.as_slice().len();
        (len, Some(len))
    }
}

pub struct TextBuffer {
    // (x, y) coordinate in internal text buffer of rows. cy == row.len() is the empty line
    // past the end of buffer
    cx: usize,
    cy: usize,
    // File editor is opening
    file: Option<FilePath>,
    // Lines of text buffer
    row: Vec<Row>,
    // Flag set to true when buffer is modified after loading or saving a file
    dirty: bool,
    model: RenderModel,
}

impl TextBuffer {
    pub fn empty(model: RenderModel) -> Self {
        Self {
            cx: 0,
            cy: 0,
            file: None,
            row: vec![],
            dirty: false,
            model,
        }
    }

    pub fn with_lines<'a, I: Iterator<Item = &'a str>>(lines: I, model: RenderModel) -> Self {
        let mut buf = Self::empty(model);
        buf.row = lines.map(|l| Row::new(l, &buf.model)).collect();
        buf
    }

    pub fn open<P: AsRef<Path>>(path: P, tab_stop: usize, reg: &SyntaxRegistry) -> Result<Self> {
        let path = path.as_ref();
        let file = FilePath::from(path);
        let model = RenderModel::new(tab_stop, reg.detect(&file.display));

        if !path.exists() {
            // When the path does not exist, consider it as a new file
            info!(target: "file", path = %file.display, "opening new file");
            let mut buf = Self::empty(model);
            buf.file = Some(file);
            return Ok(buf);
        }

        let lines = load_lines(path).map_err(|source| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!(target: "file", path = %file.display, lines = lines.len(), "file loaded");

        let mut buf = Self::with_lines(lines.iter().map(String::as_str), model);
        buf.file = Some(file);
        Ok(buf)
    }

    pub fn insert_row<S: Into<String>>(&mut self, at: usize, text: S) -> bool {
        if at > self.row.len() {
            return false;
        }
        let row = Row::new(text, &self.model);
        self.row.insert(at, row);
        self.dirty = true;
        true
    }

    pub fn delete_row(&mut self, at: usize) -> bool {
        if at >= self.row.len() {
            return false;
        }
        self.row.remove(at);
        self.dirty = true;
        true
    }

    // Inserting at the line past the end of buffer appends a new line first
    pub fn insert_char_at(&mut self, y: usize, x: usize, ch: char) -> bool {
        if y == self.row.len() {
            self.insert_row(y, "");
        }
        let model = self.model;
        match self.row.get_mut(y) {
            Some(row) => {
                row.insert_char(x, ch, &model);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn delete_char_at(&mut self, y: usize, x: usize) -> bool {
        let model = self.model;
        let deleted = self
            .row
            .get_mut(y)
            .map_or(false, |row| row.delete_char(x, &model));
        if deleted {
            self.dirty = true;
        }
        deleted
    }

    pub fn append_string_to_row<S: AsRef<str>>(&mut self, y: usize, text: S) -> bool {
        let model = self.model;
        match self.row.get_mut(y) {
            Some(row) => {
                row.append(text, &model);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    // At the head of line, a blank line is inserted above. Otherwise the right-hand part of
    // the line is moved to a new next line.
    pub fn split_row_at(&mut self, y: usize, x: usize) -> bool {
        if x == 0 {
            return self.insert_row(y, "");
        }
        let model = self.model;
        let rest = match self.row.get_mut(y) {
            Some(row) => row.split_off(x, &model),
            None => return false,
        };
        self.insert_row(y + 1, rest)
    }

    pub fn serialize(&self) -> String {
        let cap = self.row.iter().map(|r| r.buffer().len() + 1).sum();
        let mut buf = String::with_capacity(cap);
        for row in self.row.iter() {
            buf.push_str(row.buffer());
            buf.push('\n');
        }
        buf
    }

    pub fn insert_char(&mut self, ch: char) {
        if self.insert_char_at(self.cy, self.cx, ch) {
            self.cx += 1;
        }
    }

    pub fn insert_line(&mut self) {
        let x = cmp::min(self.cx, self.row.get(self.cy).map_or(0, Row::len));
        if self.split_row_at(self.cy, x) {
            self.cy += 1;
            self.cx = 0;
        }
    }

    pub fn delete_char(&mut self) {
        if self.cy == self.row.len() || self.cx == 0 && self.cy == 0 {
            return;
        }
        if self.cx > 0 {
            if self.delete_char_at(self.cy, self.cx - 1) {
                self.cx -= 1;
            }
        } else {
            // At top of line, backspace concats current line to previous line
            let removed = self.row[self.cy].buffer().to_owned();
            self.cx = self.row[self.cy - 1].len();
            self.append_string_to_row(self.cy - 1, removed);
            self.delete_row(self.cy);
            self.cy -= 1;
        }
    }

    pub fn delete_right_char(&mut self) {
        if self.cy == self.row.len() {
            return;
        }
        self.move_cursor_one(CursorDir::Right);
        self.delete_char();
    }

    pub fn move_cursor_one(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Up => self.cy = self.cy.saturating_sub(1),
            CursorDir::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    // When moving to left at top of line, move cursor to end of previous line
                    self.cy -= 1;
                    self.cx = self.row[self.cy].len();
                }
            }
            CursorDir::Down => {
                // Allow to move cursor until next line to the last line of file to enable to add a
                // new line at the end.
                if self.cy < self.row.len() {
                    self.cy += 1;
                }
            }
            CursorDir::Right => {
                if self.cy < self.row.len() {
                    let len = self.row[self.cy].len();
                    if self.cx < len {
                        // Allow to move cursor until next col to the last col of line to enable to
                        // add a new character at the end of line.
                        self.cx += 1;
                    } else {
                        // When moving to right at the end of line, move cursor to top of next line.
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
        };

        self.clamp_cursor_x();
    }

    // Snap cursor to end of line when moving up/down from longer line
    fn clamp_cursor_x(&mut self) {
        let len = self.row.get(self.cy).map_or(0, Row::len);
        if self.cx > len {
            self.cx = len;
        }
    }

    pub fn move_cursor_page(&mut self, dir: CursorDir, rowoff: usize, num_rows: usize) {
        self.cy = match dir {
            CursorDir::Up => rowoff, // Top of screen
            CursorDir::Down => {
                cmp::min(rowoff + num_rows.saturating_sub(1), self.row.len()) // Bottom of screen
            }
            _ => return,
        };
        for _ in 0..num_rows {
            self.move_cursor_one(dir);
        }
        self.clamp_cursor_x();
    }

    pub fn move_cursor_to_line_edge(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Left => self.cx = 0,
            CursorDir::Right => self.cx = self.row.get(self.cy).map_or(0, Row::len),
            CursorDir::Up | CursorDir::Down => {}
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.row
    }

    pub fn highlights_mut(&mut self, y: usize) -> Option<&mut [Highlight]> {
        self.row.get_mut(y).map(Row::highlights_mut)
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn filename(&self) -> &str {
        self.file
            .as_ref()
            .map(|f| f.display.as_str())
            .unwrap_or("[No Name]")
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    pub fn filetype(&self) -> Option<&'static str> {
        self.model.syntax().map(|s| s.filetype)
    }

    pub fn cy(&self) -> usize {
        self.cy
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    // Render column of the cursor considering tab stops
    pub fn rx(&self) -> usize {
        self.row
            .get(self.cy)
            .map_or(0, |r| r.rx_from_cx(self.cx, &self.model))
    }

    pub fn lines(&self) -> Lines<'_> {
        Lines(self.row.iter())
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cy = cmp::min(y, self.row.len());
        self.cx = x;
        self.clamp_cursor_x();
    }

    pub fn set_syntax(&mut self, syntax: Option<SyntaxRule>) {
        if self.model.syntax() == syntax.as_ref() {
            return;
        }
        debug!(
            target: "buffer",
            filetype = syntax.map_or("none", |s| s.filetype),
            "syntax changed"
        );
        self.model.set_syntax(syntax);
        let model = self.model;
        for row in self.row.iter_mut() {
            row.update(&model);
        }
    }

    pub fn set_file<S: Into<String>>(&mut self, file_path: S, reg: &SyntaxRegistry) {
        self.file = Some(FilePath::from_string(file_path));
        self.redetect_syntax(reg);
    }

    // Select the syntax rule again from the current file name
    pub fn redetect_syntax(&mut self, reg: &SyntaxRegistry) {
        let syntax = self.file.as_ref().and_then(|f| reg.detect(&f.display));
        self.set_syntax(syntax);
    }

    pub fn save(&mut self) -> std::result::Result<String, String> {
        let file = if let Some(file) = &self.file {
            file
        } else {
            return Ok("".to_string()); // Canceled
        };

        match save_content(&file.path, &self.serialize()) {
            Ok(bytes) => {
                info!(target: "file", path = %file.display, bytes, "file saved");
                self.dirty = false;
                Ok(format!("{} bytes written to disk", bytes))
            }
            Err(err) => {
                warn!(target: "file", path = %file.display, %err, "could not save file");
                Err(format!("Can't save! I/O error: {}", err))
            }
        }
    }
}
