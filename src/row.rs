use crate::highlight::{self, Highlight};
use crate::render::RenderModel;

fn byte_index_at(at: usize, s: &str) -> usize {
    s.char_indices().nth(at).map_or(s.len(), |c| c.0)
}

// Content is treated as a sequence of single-width characters. Every mutation recomputes
// `render` and `hl` together so they never disagree in length.
#[derive(Debug, Default, Clone)]
pub struct Row {
    buf: String,
    render: String,
    hl: Vec<Highlight>,
}

impl Row {
    pub fn new<S: Into<String>>(line: S, model: &RenderModel) -> Row {
        let mut row = Row {
            buf: line.into(),
            render: String::new(),
            hl: vec![],
        };
        row.update(model);
        row
    }

    pub fn buffer(&self) -> &str {
        self.buf.as_str()
    }

    pub fn render_text(&self) -> &str {
        self.render.as_str()
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.hl
    }

    // Transient overlays (e.g. search matches) write here. They are discarded on the next
    // content change.
    pub fn highlights_mut(&mut self) -> &mut [Highlight] {
        &mut self.hl
    }

    // Number of characters, which is also the largest valid cursor column
    pub fn len(&self) -> usize {
        self.buf.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn rx_from_cx(&self, cx: usize, model: &RenderModel) -> usize {
        model.rx_from_cx(&self.buf, cx)
    }

    pub fn cx_from_rx(&self, rx: usize, model: &RenderModel) -> usize {
        model.cx_from_rx(&self.buf, rx)
    }

    pub fn update(&mut self, model: &RenderModel) {
        self.render = model.derive_render(&self.buf);
        self.hl = highlight::classify(&self.render, model.syntax());
        debug_assert_eq!(self.hl.len(), self.render.chars().count());
    }

    // Note: 'at' is an index of buffer, not render text
    pub fn insert_char(&mut self, at: usize, c: char, model: &RenderModel) {
        let idx = byte_index_at(at, &self.buf);
        self.buf.insert(idx, c);
        self.update(model);
    }

    pub fn delete_char(&mut self, at: usize, model: &RenderModel) -> bool {
        let idx = byte_index_at(at, &self.buf);
        if idx >= self.buf.len() {
            return false;
        }
        self.buf.remove(idx);
        self.update(model);
        true
    }

    pub fn append<S: AsRef<str>>(&mut self, s: S, model: &RenderModel) {
        let s = s.as_ref();
        if s.is_empty() {
            return;
        }
        self.buf.push_str(s);
        self.update(model);
    }

    // Cut the row at `at` and return the right-hand part
    pub fn split_off(&mut self, at: usize, model: &RenderModel) -> String {
        let idx = byte_index_at(at, &self.buf);
        if idx >= self.buf.len() {
            return String::new();
        }
        let rest = self.buf.split_off(idx);
        self.update(model);
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{SyntaxFlags, SyntaxRule};
    use pretty_assertions::assert_eq;

    const NUMS: SyntaxRule = SyntaxRule {
        filetype: "test",
        filematch: &[".t"],
        flags: SyntaxFlags::NUMBERS,
    };

    fn numbers() -> RenderModel {
        RenderModel::new(8, Some(NUMS))
    }

    #[test]
    fn render_and_highlight_lengths_agree() {
        let m = numbers();
        let mut row = Row::new("\t1", &m);
        assert_eq!(row.render_text().len(), row.highlights().len());
        row.insert_char(0, '\t', &m);
        assert_eq!(row.render_text().len(), 17);
        assert_eq!(row.highlights().len(), 17);
        row.delete_char(0, &m);
        row.append("\t22", &m);
        assert_eq!(row.render_text().len(), row.highlights().len());
        row.split_off(1, &m);
        assert_eq!(row.render_text().len(), row.highlights().len());
    }

    #[test]
    fn insert_then_delete_restores_content() {
        let m = numbers();
        for at in 0..=3 {
            let mut row = Row::new("a\tc", &m);
            row.insert_char(at, 'x', &m);
            assert!(row.delete_char(at, &m));
            assert_eq!(row.buffer(), "a\tc");
            assert_eq!(row.render_text(), "a       c");
        }
    }

    #[test]
    fn insert_past_end_appends() {
        let m = RenderModel::default();
        let mut row = Row::new("ab", &m);
        row.insert_char(10, 'c', &m);
        assert_eq!(row.buffer(), "abc");
    }

    #[test]
    fn delete_out_of_range_is_noop() {
        let m = RenderModel::default();
        let mut row = Row::new("ab", &m);
        assert!(!row.delete_char(2, &m));
        assert_eq!(row.buffer(), "ab");
    }

    #[test]
    fn split_off_returns_rest() {
        let m = RenderModel::default();
        let mut row = Row::new("hello world", &m);
        assert_eq!(row.split_off(5, &m), " world");
        assert_eq!(row.buffer(), "hello");
        assert_eq!(row.render_text(), "hello");
        assert_eq!(row.split_off(5, &m), "");
    }

    #[test]
    fn columns_are_character_indices() {
        let m = RenderModel::default();
        let mut row = Row::new("a\u{e9}b", &m);
        assert_eq!(row.len(), 3);
        row.insert_char(2, 'x', &m);
        assert_eq!(row.buffer(), "a\u{e9}xb");
        assert!(row.delete_char(1, &m));
        assert_eq!(row.buffer(), "axb");
    }

    #[test]
    fn content_change_discards_overlay() {
        let m = numbers();
        let mut row = Row::new("ab", &m);
        row.highlights_mut()[0] = Highlight::Match;
        row.append("3", &m);
        assert_eq!(row.highlights(), &[Highlight::Normal; 3][..]);
    }
}
