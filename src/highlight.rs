use crate::syntax::SyntaxRule;
use crate::term_color::Color;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Highlight {
    Normal,
    Number,
    Match,
}

impl Default for Highlight {
    fn default() -> Self {
        Highlight::Normal
    }
}

impl Highlight {
    pub fn color(self) -> Color {
        use Color::*;
        use Highlight::*;
        match self {
            Normal => Reset,
            Number => Red,
            Match => Blue,
        }
    }
}

fn is_sep(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\0' || ",.()+-/*=~%<>[];".contains(c)
}

/// Classify each character of rendered text. Output length always equals the number of
/// characters in `render`.
pub fn classify(render: &str, syntax: Option<&SyntaxRule>) -> Vec<Highlight> {
    let mut hl = vec![Highlight::Normal; render.chars().count()];

    if !syntax.map_or(false, SyntaxRule::highlights_numbers) {
        return hl;
    }

    // Beginning of line is considered as separator
    let mut prev_sep = true;
    let mut prev_hl = Highlight::Normal;

    for (out, c) in hl.iter_mut().zip(render.chars()) {
        let prev_is_number = prev_hl == Highlight::Number;
        if c.is_ascii_digit() && (prev_sep || prev_is_number) || c == '.' && prev_is_number {
            *out = Highlight::Number;
            prev_hl = Highlight::Number;
            prev_sep = false;
            continue;
        }
        prev_hl = Highlight::Normal;
        prev_sep = is_sep(c);
    }

    hl
}
