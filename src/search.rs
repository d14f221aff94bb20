use crate::error::Result;
use crate::highlight::Highlight;
use crate::input::{InputSeq, KeySeq};
use crate::prompt::{Action, Prompt, PromptEdit, PromptResult};
use crate::text_buffer::TextBuffer;
use std::io::Write;
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FindDir {
    Back,
    Forward,
}

impl Default for FindDir {
    fn default() -> Self {
        FindDir::Forward
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Match {
    pub row: usize,
    // Offset of the match in render text
    pub rx: usize,
    pub cx: usize,
    pub len: usize,
}

/// State of incremental search. Match highlight is overlaid on one row at most and the row's
/// original highlights are kept to restore them.
#[derive(Default, Debug)]
pub struct SearchSession {
    dir: FindDir,
    last_match: Option<usize>,
    saved_hl: Option<(usize, Vec<Highlight>)>,
}

impl SearchSession {
    pub fn dir(&self) -> FindDir {
        self.dir
    }

    pub fn last_match(&self) -> Option<usize> {
        self.last_match
    }

    pub fn restore_highlight(&mut self, buf: &mut TextBuffer) {
        if let Some((y, saved)) = self.saved_hl.take() {
            if let Some(hl) = buf.highlights_mut(y) {
                if hl.len() == saved.len() {
                    hl.copy_from_slice(&saved);
                }
            }
        }
    }

    // Restore the overlay and forget the match position
    pub fn reset(&mut self, buf: &mut TextBuffer) {
        self.restore_highlight(buf);
        self.last_match = None;
        self.dir = FindDir::Forward;
    }

    fn handle_seq(&mut self, seq: InputSeq) {
        use KeySeq::*;
        match seq.key {
            RightKey | DownKey => self.dir = FindDir::Forward,
            LeftKey | UpKey => self.dir = FindDir::Back,
            _ => {
                // New input might change query
                self.last_match = None;
                self.dir = FindDir::Forward;
            }
        }
        if self.last_match.is_none() {
            self.dir = FindDir::Forward;
        }
    }

    fn next_row(&self, current: Option<usize>, num_rows: usize) -> usize {
        match (current, self.dir) {
            (None, _) => 0,
            (Some(y), FindDir::Forward) if y + 1 >= num_rows => 0, // Wrapped
            (Some(y), FindDir::Forward) => y + 1,
            (Some(0), FindDir::Back) => num_rows - 1, // Wrapped
            (Some(y), FindDir::Back) => y - 1,
        }
    }

    pub fn advance(&mut self, query: &str, seq: InputSeq, buf: &mut TextBuffer) -> Option<Match> {
        self.restore_highlight(buf);
        self.handle_seq(seq);

        if query.is_empty() {
            return None;
        }

        let num_rows = buf.rows().len();
        let mut current = self.last_match;
        let mut found = None;
        for _ in 0..num_rows {
            let y = self.next_row(current, num_rows);
            current = Some(y);
            let render = buf.rows()[y].render_text();
            if let Some(idx) = render.find(query) {
                let rx = render[..idx].chars().count();
                found = Some((y, rx));
                break;
            }
        }

        let (row, rx) = found?;
        let cx = buf.rows()[row].cx_from_rx(rx, buf.model());
        let len = query.chars().count();
        self.last_match = Some(row);
        buf.set_cursor(cx, row);

        if let Some(hl) = buf.highlights_mut(row) {
            self.saved_hl = Some((row, hl.to_vec()));
            let end = (rx + len).min(hl.len());
            for h in hl[rx..end].iter_mut() {
                *h = Highlight::Match;
            }
        }

        debug!(target: "search", query, row, rx, "match");
        Some(Match { row, rx, cx, len })
    }
}

/// Incremental search driven by prompt input. Cursor and scroll position are restored when the
/// search is canceled.
pub struct TextSearch {
    session: SearchSession,
    saved_cursor: (usize, usize),
    saved_offsets: (usize, usize),
    matched: bool,
}

impl TextSearch {
    pub fn new<W: Write>(prompt: &Prompt<'_, W>) -> Self {
        let vp = prompt.screen.viewport();
        Self {
            session: SearchSession::default(),
            saved_cursor: prompt.buf.cursor(),
            saved_offsets: (vp.rowoff, vp.coloff),
            matched: false,
        }
    }
}

impl Action for TextSearch {
    fn on_seq<W: Write>(
        &mut self,
        prompt: &mut Prompt<'_, W>,
        input: &str,
        seq: InputSeq,
        edit: PromptEdit,
    ) -> Result<()> {
        match (edit, seq.key, seq.ctrl) {
            (PromptEdit::Submit, ..) | (PromptEdit::Cancel, ..) => {
                self.session.reset(prompt.buf);
            }
            // Enter on an empty query leaves the prompt open and the current match as is
            (_, KeySeq::Key(b'm'), true) => {}
            _ => {
                let m = self.session.advance(input, seq, prompt.buf);
                self.matched = m.is_some();
                if m.is_some() {
                    // Cause scroll at next redraw so that the matched line comes to the top
                    let num_rows = prompt.buf.rows().len();
                    prompt.screen.viewport_mut().invalidate_rowoff(num_rows);
                }
            }
        }
        Ok(())
    }

    fn on_end<W: Write>(
        mut self,
        prompt: &mut Prompt<'_, W>,
        result: PromptResult,
    ) -> Result<PromptResult> {
        self.session.reset(prompt.buf);

        match &result {
            PromptResult::Canceled => {
                let (cx, cy) = self.saved_cursor;
                prompt.buf.set_cursor(cx, cy);
                let vp = prompt.screen.viewport_mut();
                vp.rowoff = self.saved_offsets.0;
                vp.coloff = self.saved_offsets.1;
                prompt.screen.set_info_message("Search canceled");
            }
            PromptResult::Input(_) if self.matched => prompt.screen.set_info_message("Found"),
            PromptResult::Input(_) => prompt.screen.set_info_message("Not found"),
        }

        Ok(result)
    }
}
