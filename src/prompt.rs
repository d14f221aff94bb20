use crate::error::Result;
use crate::input::{InputSeq, KeySeq};
use crate::screen::Screen;
use crate::text_buffer::TextBuffer;
use std::io::Write;
use tracing::trace;

#[derive(PartialEq, Debug)]
pub enum PromptResult {
    Canceled,
    Input(String),
}

// What a key stroke did to the prompt input
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum PromptEdit {
    Edited,
    Unchanged,
    Submit,
    Cancel,
}

pub trait Action: Sized {
    fn on_seq<W: Write>(
        &mut self,
        _prompt: &mut Prompt<'_, W>,
        _input: &str,
        _seq: InputSeq,
        _edit: PromptEdit,
    ) -> Result<()> {
        Ok(())
    }

    fn on_end<W: Write>(
        self, // Note: Consumes self
        _prompt: &mut Prompt<'_, W>,
        result: PromptResult,
    ) -> Result<PromptResult> {
        Ok(result)
    }
}

pub struct NoAction;
impl Action for NoAction {}

/// Prompt message with "{}" placeholder where the input is shown.
#[derive(Debug, PartialEq)]
pub struct PromptTemplate<'a> {
    prefix: &'a str,
    suffix: &'a str,
}

impl<'a> PromptTemplate<'a> {
    pub fn parse(template: &'a str) -> Self {
        let mut it = template.splitn(2, "{}");
        let prefix = it.next().unwrap_or("");
        let suffix = it.next().unwrap_or("");
        PromptTemplate { prefix, suffix }
    }

    pub fn build(&self, input: &str) -> String {
        let cap = self.prefix.len() + self.suffix.len() + input.len();
        let mut buf = String::with_capacity(cap);
        buf.push_str(self.prefix);
        buf.push_str(input);
        buf.push_str(self.suffix);
        buf
    }
}

/// Single line input edited in the message line.
#[derive(Default, Debug)]
pub struct PromptInput {
    buf: String,
}

impl PromptInput {
    pub fn as_str(&self) -> &str {
        self.buf.as_str()
    }

    pub fn handle(&mut self, seq: InputSeq) -> PromptEdit {
        use KeySeq::*;
        match (seq.key, seq.ctrl) {
            (Key(b'h'), true) | (BackspaceKey, ..) | (DeleteKey, ..) => {
                if self.buf.pop().is_some() {
                    PromptEdit::Edited
                } else {
                    PromptEdit::Unchanged
                }
            }
            (EscapeKey, ..) => PromptEdit::Cancel,
            // Enter with empty input is ignored
            (Key(b'm'), true) if !self.buf.is_empty() => PromptEdit::Submit,
            (Key(b), false) if b.is_ascii() && !b.is_ascii_control() => {
                self.buf.push(b as char);
                PromptEdit::Edited
            }
            _ => PromptEdit::Unchanged,
        }
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

pub struct Prompt<'a, W: Write> {
    pub screen: &'a mut Screen<W>,
    pub buf: &'a mut TextBuffer,
}

impl<'a, W: Write> Prompt<'a, W> {
    pub fn new(screen: &'a mut Screen<W>, buf: &'a mut TextBuffer) -> Self {
        Self { screen, buf }
    }

    fn render_screen(&mut self, input: &str, template: &PromptTemplate<'_>) -> Result<()> {
        self.screen.set_info_message(template.build(input));
        self.screen.refresh(self.buf)?;
        Ok(())
    }

    pub fn run<A, I>(&mut self, prompt: &str, mut action: A, input: I) -> Result<PromptResult>
    where
        A: Action,
        I: Iterator<Item = Result<InputSeq>>,
    {
        let template = PromptTemplate::parse(prompt);
        let mut line = PromptInput::default();
        let mut result = PromptResult::Canceled; // When input ends, consider it as canceled

        self.render_screen("", &template)?;

        for seq in input {
            let seq = seq?;
            if seq.key == KeySeq::Unidentified {
                continue;
            }
            trace!(target: "editor", %seq, "prompt key");

            let edit = line.handle(seq);
            action.on_seq(self, line.as_str(), seq, edit)?;

            match edit {
                PromptEdit::Cancel => break,
                PromptEdit::Submit => {
                    result = PromptResult::Input(line.into_string());
                    break;
                }
                PromptEdit::Edited | PromptEdit::Unchanged => {
                    self.render_screen(line.as_str(), &template)?;
                }
            }
        }

        action.on_end(self, result)
    }
}
