use crate::config::DEFAULT_TAB_STOP;
use crate::syntax::SyntaxRule;

/// How logical row content is laid out on the fixed-width grid: tab expansion plus the rule
/// used to classify rendered characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderModel {
    tab_stop: usize,
    syntax: Option<SyntaxRule>,
}

impl Default for RenderModel {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_STOP, None)
    }
}

impl RenderModel {
    pub fn new(tab_stop: usize, syntax: Option<SyntaxRule>) -> Self {
        Self {
            tab_stop: tab_stop.max(1),
            syntax,
        }
    }

    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    pub fn syntax(&self) -> Option<&SyntaxRule> {
        self.syntax.as_ref()
    }

    pub fn set_syntax(&mut self, syntax: Option<SyntaxRule>) {
        self.syntax = syntax;
    }

    fn advance(&self, rx: usize, ch: char) -> usize {
        if ch == '\t' {
            // Proceed to next tab stop
            rx + self.tab_stop - (rx % self.tab_stop)
        } else {
            rx + 1
        }
    }

    pub fn derive_render(&self, chars: &str) -> String {
        let tabs = chars.bytes().filter(|b| *b == b'\t').count();
        let mut render = String::with_capacity(chars.len() + tabs * (self.tab_stop - 1));
        let mut col = 0;
        for c in chars.chars() {
            if c == '\t' {
                loop {
                    render.push(' ');
                    col += 1;
                    if col % self.tab_stop == 0 {
                        break;
                    }
                }
            } else {
                render.push(c);
                col += 1;
            }
        }
        render
    }

    pub fn rx_from_cx(&self, chars: &str, cx: usize) -> usize {
        chars
            .chars()
            .take(cx)
            .fold(0, |rx, ch| self.advance(rx, ch))
    }

    pub fn cx_from_rx(&self, chars: &str, rx: usize) -> usize {
        let mut current_rx = 0;
        for (cx, ch) in chars.chars().enumerate() {
            current_rx = self.advance(current_rx, ch);
            if current_rx > rx {
                return cx; // Found
            }
        }
        chars.chars().count() // Fall back to end of line
    }
}
