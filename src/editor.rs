use crate::config::Config;
use crate::error::Result;
use crate::input::{InputSeq, KeySeq};
use crate::prompt::{NoAction, Prompt, PromptResult};
use crate::render::RenderModel;
use crate::screen::Screen;
use crate::search::TextSearch;
use crate::syntax::SyntaxRegistry;
use crate::text_buffer::{CursorDir, Lines, TextBuffer};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

pub const HELP_TEXT: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

pub struct Editor<I: Iterator<Item = Result<InputSeq>>, W: Write> {
    input: I, // Escape sequences stream represented as Iterator
    screen: Screen<W>,
    buf: TextBuffer,
    config: Config,
    registry: SyntaxRegistry,
    // Remaining Ctrl-Q presses to quit with unsaved changes
    quit_times: usize,
}

impl<I, W> Editor<I, W>
where
    I: Iterator<Item = Result<InputSeq>>,
    W: Write,
{
    fn with_buf(
        buf: TextBuffer,
        input: I,
        output: W,
        window_size: (usize, usize),
        config: Config,
    ) -> Result<Editor<I, W>> {
        let mut screen = Screen::new(window_size, output, config.message_timeout)?;
        screen.set_info_message(HELP_TEXT);
        info!(
            target: "editor",
            file = buf.filename(),
            cols = window_size.0,
            rows = window_size.1,
            "editor started"
        );
        Ok(Editor {
            input,
            screen,
            buf,
            config,
            registry: SyntaxRegistry::default(),
            quit_times: config.quit_times,
        })
    }

    pub fn new(
        input: I,
        output: W,
        window_size: (usize, usize),
        config: Config,
    ) -> Result<Editor<I, W>> {
        let buf = TextBuffer::empty(RenderModel::new(config.tab_stop, None));
        Self::with_buf(buf, input, output, window_size, config)
    }

    pub fn with_lines<'a, L: Iterator<Item = &'a str>>(
        lines: L,
        input: I,
        output: W,
        window_size: (usize, usize),
        config: Config,
    ) -> Result<Editor<I, W>> {
        let buf = TextBuffer::with_lines(lines, RenderModel::new(config.tab_stop, None));
        Self::with_buf(buf, input, output, window_size, config)
    }

    pub fn open<P: AsRef<Path>>(
        path: P,
        input: I,
        output: W,
        window_size: (usize, usize),
        config: Config,
    ) -> Result<Editor<I, W>> {
        let buf = TextBuffer::open(path, config.tab_stop, &SyntaxRegistry::default())?;
        Self::with_buf(buf, input, output, window_size, config)
    }

    // Replace the filetype rules. The current file's rule is selected again.
    pub fn set_registry(&mut self, registry: SyntaxRegistry) {
        self.buf.redetect_syntax(&registry);
        self.registry = registry;
    }

    fn prompt(&mut self, prompt: &str) -> Result<PromptResult> {
        Prompt::new(&mut self.screen, &mut self.buf).run(prompt, NoAction, &mut self.input)
    }

    fn save(&mut self) -> Result<()> {
        if !self.buf.has_file() {
            match self.prompt("Save as: {} (ESC to cancel)")? {
                PromptResult::Input(name) => self.buf.set_file(name, &self.registry),
                PromptResult::Canceled => {
                    self.screen.set_info_message("Save aborted");
                    return Ok(());
                }
            }
        }

        match self.buf.save() {
            Ok(msg) => self.screen.set_info_message(msg),
            Err(msg) => self.screen.set_error_message(msg),
        }

        Ok(())
    }

    fn find(&mut self) -> Result<()> {
        let mut prompt = Prompt::new(&mut self.screen, &mut self.buf);
        let search = TextSearch::new(&prompt);
        prompt.run("Search: {} (Use ESC/Arrows/Enter)", search, &mut self.input)?;
        Ok(())
    }

    fn handle_quit(&mut self) -> bool {
        if !self.buf.dirty() {
            return true;
        }
        self.quit_times = self.quit_times.saturating_sub(1);
        if self.quit_times == 0 {
            info!(target: "editor", file = self.buf.filename(), "quit discarding unsaved changes");
            return true;
        }
        self.screen.set_error_message(format!(
            "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
            self.quit_times
        ));
        false
    }

    fn handle_not_mapped(&mut self, seq: InputSeq) {
        self.screen
            .set_error_message(format!("Key '{}' not mapped", seq));
    }

    // Returns true when the editor should quit
    pub fn process_keypress(&mut self, s: InputSeq) -> Result<bool> {
        use KeySeq::*;

        let rowoff = self.screen.viewport().rowoff;
        let rows = self.screen.rows();

        debug!(target: "editor", key = %s, "keypress");

        match s {
            InputSeq {
                key: Unidentified, ..
            } => return Ok(false),
            InputSeq { key, ctrl: true } => match key {
                Key(b'q') => {
                    if self.handle_quit() {
                        return Ok(true);
                    }
                    return Ok(false); // Keep the counter
                }
                Key(b's') => self.save()?,
                Key(b'f') => self.find()?,
                Key(b'h') => self.buf.delete_char(),
                Key(b'i') => self.buf.insert_char('\t'),
                Key(b'm') => self.buf.insert_line(),
                Key(b'l') => {} // Screen is redrawn after every key
                _ => self.handle_not_mapped(s),
            },
            InputSeq { key, .. } => match key {
                EscapeKey => {}
                BackspaceKey => self.buf.delete_char(),
                DeleteKey => self.buf.delete_right_char(),
                // Only printable ASCII is inserted. Other control bytes and bytes of multi-byte
                // characters fall through to "not mapped".
                Key(b) if b.is_ascii() && !b.is_ascii_control() => self.buf.insert_char(b as char),
                UpKey => self.buf.move_cursor_one(CursorDir::Up),
                LeftKey => self.buf.move_cursor_one(CursorDir::Left),
                DownKey => self.buf.move_cursor_one(CursorDir::Down),
                RightKey => self.buf.move_cursor_one(CursorDir::Right),
                PageUpKey => self.buf.move_cursor_page(CursorDir::Up, rowoff, rows),
                PageDownKey => self.buf.move_cursor_page(CursorDir::Down, rowoff, rows),
                HomeKey => self.buf.move_cursor_to_line_edge(CursorDir::Left),
                EndKey => self.buf.move_cursor_to_line_edge(CursorDir::Right),
                _ => self.handle_not_mapped(s),
            },
        }

        self.quit_times = self.config.quit_times;
        Ok(false)
    }

    pub fn edit(&mut self) -> Result<()> {
        self.screen.refresh(&self.buf)?; // First paint

        while let Some(seq) = self.input.next() {
            if self.process_keypress(seq?)? {
                info!(target: "editor", "quit");
                break;
            }
            self.screen.refresh(&self.buf)?;
        }

        Ok(())
    }

    pub fn clear_screen(&mut self) -> Result<()> {
        self.screen.clear()?;
        Ok(())
    }

    pub fn lines(&self) -> Lines<'_> {
        self.buf.lines()
    }

    pub fn buf(&self) -> &TextBuffer {
        &self.buf
    }

    pub fn screen(&self) -> &'_ Screen<W> {
        &self.screen
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
