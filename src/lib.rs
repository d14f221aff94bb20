// Refs:
//   Build Your Own Text Editor: https://viewsourcecode.org/snaptoken/kilo/index.html
//   VT100 User Guide: https://vt100.net/docs/vt100-ug/chapter3.html

mod config;
mod editor;
mod error;
mod highlight;
mod input;
mod prompt;
mod render;
mod row;
mod screen;
mod search;
mod status_bar;
mod syntax;
mod term_color;
mod text_buffer;
mod viewport;

#[cfg(test)]
mod ui_test;

pub use config::Config;
pub use editor::Editor;
pub use error::{Error, Result};
pub use highlight::Highlight;
pub use input::{ByteSource, InputSeq, InputSequences, KeyDecoder, KeySeq, ReadBytes, StdinRawMode};
pub use render::RenderModel;
pub use row::Row;
pub use screen::{get_window_size_fallback, Screen, VERSION};
pub use search::{Match, SearchSession};
pub use syntax::{SyntaxFlags, SyntaxRegistry, SyntaxRule};
pub use text_buffer::{CursorDir, TextBuffer};
pub use viewport::Viewport;
