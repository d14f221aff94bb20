use crate::error::{Error, Result};
use crate::input::ByteSource;
use crate::status_bar::StatusBar;
use crate::term_color::{Color, TermColor};
use crate::text_buffer::TextBuffer;
use crate::viewport::Viewport;
use std::io::{self, Write};
use std::time::{Duration, SystemTime};
use tracing::debug;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum StatusMessageKind {
    Info,
    Error,
}

struct StatusMessage {
    text: String,
    timestamp: SystemTime,
    kind: StatusMessageKind,
}

impl StatusMessage {
    fn new<S: Into<String>>(message: S, kind: StatusMessageKind) -> StatusMessage {
        StatusMessage {
            text: message.into(),
            timestamp: SystemTime::now(),
            kind,
        }
    }
}

// Parse response of cursor position report: ESC [ <rows> ; <cols> R
fn parse_cursor_report(res: &[u8]) -> Option<(usize, usize)> {
    let res = std::str::from_utf8(res).ok()?;
    let body = res.strip_prefix("\x1b[")?.strip_suffix('R')?;
    let mut it = body.splitn(2, ';');
    let rows = it.next()?.parse().ok()?;
    let cols = it.next()?.parse().ok()?;
    Some((cols, rows))
}

/// Query window size as (cols, rows) by moving the cursor to the bottom-right corner and asking
/// its position.
pub fn get_window_size_fallback<S, W>(source: &mut S, mut output: W) -> Result<(usize, usize)>
where
    S: ByteSource,
    W: Write,
{
    // \x1b[9999;9999H is not available since it does not guarantee cursor stops on the corner
    output.write_all(b"\x1b[999C\x1b[999B\x1b[6n")?;
    output.flush()?;

    let mut res = Vec::with_capacity(32);
    while res.len() < 32 {
        match source.read_byte()? {
            Some(b'R') => {
                res.push(b'R');
                break;
            }
            Some(b) => res.push(b),
            None => break, // Timed out
        }
    }

    let size = parse_cursor_report(&res).ok_or(Error::UnknownWindowSize)?;
    debug!(target: "editor", cols = size.0, rows = size.1, "window size from cursor position");
    Ok(size)
}

pub struct Screen<W: Write> {
    output: W,
    viewport: Viewport,
    // X coordinate in `render` text of rows
    rx: usize,
    message: Option<StatusMessage>,
    message_timeout: Duration,
    pub term_color: TermColor,
}

impl<W: Write> Screen<W> {
    pub fn new(size: (usize, usize), output: W, message_timeout: Duration) -> Result<Self> {
        let (w, h) = size;
        if w < 1 || h < 3 {
            return Err(Error::TooSmallWindow(w, h));
        }

        Ok(Self {
            output,
            // Screen height is 2 lines less than window height due to status bar and message bar
            viewport: Viewport::new(h - 2, w),
            rx: 0,
            message: None,
            message_timeout,
            term_color: TermColor::from_env(),
        })
    }

    pub fn rows(&self) -> usize {
        self.viewport.rows()
    }

    pub fn cols(&self) -> usize {
        self.viewport.cols()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn set_info_message<S: Into<String>>(&mut self, message: S) {
        self.message = Some(StatusMessage::new(message, StatusMessageKind::Info));
    }

    pub fn set_error_message<S: Into<String>>(&mut self, message: S) {
        self.message = Some(StatusMessage::new(message, StatusMessageKind::Error));
    }

    pub fn message_text(&self) -> &str {
        self.message.as_ref().map_or("", |m| m.text.as_str())
    }

    pub fn message_kind(&self) -> Option<StatusMessageKind> {
        self.message.as_ref().map(|m| m.kind)
    }

    fn draw_welcome_message(&self, buf: &mut Vec<u8>) -> io::Result<()> {
        let msg = format!("Sanky editor -- version {}", VERSION);
        let welcome: String = msg.chars().take(self.cols()).collect();
        let mut padding = (self.cols() - welcome.len()) / 2;
        if padding > 0 {
            buf.write_all(b"~")?;
            padding -= 1;
        }
        for _ in 0..padding {
            buf.write_all(b" ")?;
        }
        buf.write_all(welcome.as_bytes())
    }

    fn draw_rows(&self, buf: &mut Vec<u8>, text: &TextBuffer) -> io::Result<()> {
        let rows = text.rows();
        let mut prev_color = Color::Reset;

        for y in 0..self.rows() {
            let file_row = self.viewport.file_row(y);

            // Move cursor to target line
            write!(buf, "\x1b[{}H", y + 1)?;

            if file_row >= rows.len() {
                if prev_color != Color::Reset {
                    buf.write_all(self.term_color.sequence(Color::Reset))?;
                    prev_color = Color::Reset;
                }
                if rows.is_empty() && y == self.rows() / 3 {
                    self.draw_welcome_message(buf)?;
                } else {
                    buf.write_all(b"~")?;
                }
            } else {
                let row = &rows[file_row];
                let render: Vec<char> = row.render_text().chars().collect();
                let range = self.viewport.visible_range(render.len());
                let hls = &row.highlights()[range.clone()];
                for (c, hl) in render[range].iter().zip(hls.iter()) {
                    let color = hl.color();
                    if color != prev_color {
                        buf.write_all(self.term_color.sequence(color))?;
                        prev_color = color;
                    }
                    write!(buf, "{}", c)?;
                }
            }

            // Erases the part of the line to the right of the cursor. http://vt100.net/docs/vt100-ug/chapter3.html#EL
            buf.write_all(b"\x1b[K")?;
        }

        if prev_color != Color::Reset {
            buf.write_all(self.term_color.sequence(Color::Reset))?; // Ensure to reset color at end of screen
        }

        Ok(())
    }

    fn draw_status_bar(&self, buf: &mut Vec<u8>, text: &TextBuffer) -> io::Result<()> {
        write!(buf, "\x1b[{}H", self.rows() + 1)?;
        buf.write_all(self.term_color.sequence(Color::Invert))?;
        let bar = StatusBar::from_buf(text);
        buf.write_all(bar.layout(self.cols()).as_bytes())?;
        // Default argument of 'm' command is 0 so it resets attributes
        buf.write_all(self.term_color.sequence(Color::Reset))
    }

    fn draw_message_bar(&self, buf: &mut Vec<u8>) -> io::Result<()> {
        write!(buf, "\x1b[{}H", self.rows() + 2)?;
        if let Some(message) = &self.message {
            let alive = SystemTime::now()
                .duration_since(message.timestamp)
                .map_or(true, |d| d < self.message_timeout);
            if alive {
                let msg: String = message.text.chars().take(self.cols()).collect();
                if message.kind == StatusMessageKind::Error {
                    buf.write_all(self.term_color.sequence(Color::RedBG))?;
                    buf.write_all(msg.as_bytes())?;
                    buf.write_all(self.term_color.sequence(Color::Reset))?;
                } else {
                    buf.write_all(msg.as_bytes())?;
                }
            }
        }
        buf.write_all(b"\x1b[K")
    }

    /// Assemble one frame of the screen. Scroll position is adjusted to keep the cursor visible.
    pub fn frame(&mut self, text: &TextBuffer) -> io::Result<Vec<u8>> {
        // Calculate X coordinate to render considering tab stop
        self.rx = text.rx();
        self.viewport.scroll(text.cy(), self.rx);

        let mut buf = Vec::with_capacity((self.rows() + 2) * self.cols());

        // \x1b[: Escape sequence header
        // Hide cursor while updating screen. 'l' is command to set mode http://vt100.net/docs/vt100-ug/chapter3.html#SM
        buf.write_all(b"\x1b[?25l")?;
        // H: Command to move cursor. Here \x1b[H is the same as \x1b[1;1H
        buf.write_all(b"\x1b[H")?;

        self.draw_rows(&mut buf, text)?;
        self.draw_status_bar(&mut buf, text)?;
        self.draw_message_bar(&mut buf)?;

        // Move cursor
        let (y, x) = self.viewport.project(text.cy(), self.rx);
        write!(buf, "\x1b[{};{}H", y + 1, x + 1)?;

        // Reveal cursor again. 'h' is command to reset mode https://vt100.net/docs/vt100-ug/chapter3.html#RM
        buf.write_all(b"\x1b[?25h")?;

        Ok(buf)
    }

    pub fn refresh(&mut self, text: &TextBuffer) -> io::Result<()> {
        let frame = self.frame(text)?;
        self.output.write_all(&frame)?;
        self.output.flush()
    }

    pub fn clear(&mut self) -> io::Result<()> {
        // 2: Argument of 'J' command to reset entire screen
        // J: Command to erase screen http://vt100.net/docs/vt100-ug/chapter3.html#ED
        self.output.write_all(b"\x1b[2J")?;
        // Set cursor position to left-top corner
        self.output.write_all(b"\x1b[H")?;
        self.output.flush()
    }
}
