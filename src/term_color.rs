use std::env;
use term::terminfo::TermInfo;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Color {
    Reset,
    Red,
    Blue,
    RedBG,
    Invert,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TermColor {
    TrueColor,
    Extended256,
    Only16,
}

impl TermColor {
    pub fn from_env() -> TermColor {
        env::var("COLORTERM")
            .ok()
            .and_then(|v| {
                if v == "truecolor" {
                    Some(TermColor::TrueColor)
                } else {
                    None
                }
            })
            .or_else(|| {
                TermInfo::from_env().ok().and_then(|info| {
                    info.numbers.get("colors").map(|colors| {
                        if *colors == 256 {
                            TermColor::Extended256
                        } else {
                            TermColor::Only16
                        }
                    })
                })
            })
            .unwrap_or(TermColor::Only16)
    }

    pub fn sequence(self, color: Color) -> &'static [u8] {
        // 'm' sets attributes to text printed after: https://vt100.net/docs/vt100-ug/chapter3.html#SGR
        // 256 colors: '\x1b[38;5;<n>m' (fg), '\x1b[48;5;<n>m' (bg)
        // 24bit colors: '\x1b[38;2;<r>;<g>;<b>m' (fg), '\x1b[48;2;<r>;<g>;<b>m' (bg)
        use Color::*;
        match self {
            TermColor::TrueColor => match color {
                Reset => b"\x1b[39;0m",
                Red => b"\x1b[38;2;251;73;52m",
                Blue => b"\x1b[38;2;131;165;152m",
                RedBG => b"\x1b[48;2;204;36;29m",
                Invert => b"\x1b[7m",
            },
            TermColor::Extended256 => match color {
                Reset => b"\x1b[39;0m",
                Red => b"\x1b[38;5;167m",
                Blue => b"\x1b[38;5;109m",
                RedBG => b"\x1b[48;5;124m",
                Invert => b"\x1b[7m",
            },
            TermColor::Only16 => match color {
                Reset => b"\x1b[39;0m",
                Red => b"\x1b[31m",
                Blue => b"\x1b[34m",
                RedBG => b"\x1b[41m",
                Invert => b"\x1b[7m",
            },
        }
    }
}
