use crate::error::Result;
use std::fmt;
use std::io::{self, Read};
use std::os::unix::io::AsRawFd;
use tracing::trace;

/// Source of raw input bytes. `Ok(None)` means no byte arrived within the read timeout.
pub trait ByteSource {
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

pub struct StdinRawMode {
    stdin: io::Stdin,
    orig: termios::Termios,
}

impl StdinRawMode {
    // `read_timeout_ds` is the read timeout in 1/10 seconds
    pub fn new(read_timeout_ds: u8) -> Result<StdinRawMode> {
        use termios::*;

        let stdin = io::stdin();
        let fd = stdin.as_raw_fd();
        let mut termios = Termios::from_fd(fd)?;
        let orig = termios;

        // Set terminal raw mode. Disable echo back, canonical mode, signals (SIGINT, SIGTSTP) and Ctrl+V.
        termios.c_lflag &= !(ECHO | ICANON | ISIG | IEXTEN);
        // Disable control flow mode (Ctrl+Q/Ctrl+S) and CR-to-NL translation
        termios.c_iflag &= !(IXON | ICRNL | BRKINT | INPCK | ISTRIP);
        // Disable output processing such as \n to \r\n translation
        termios.c_oflag &= !OPOST;
        // Ensure character size is 8bits
        termios.c_cflag |= CS8;
        // Do not wait for next byte with blocking since reading 0 byte is permitted
        termios.c_cc[VMIN] = 0;
        // read() returns 0 bytes after the timeout
        termios.c_cc[VTIME] = read_timeout_ds;
        // Apply terminal configurations
        tcsetattr(fd, TCSAFLUSH, &termios)?;

        Ok(StdinRawMode { stdin, orig })
    }

    pub fn input_keys(self) -> InputSequences<Self> {
        InputSequences::new(self)
    }
}

impl Drop for StdinRawMode {
    fn drop(&mut self) {
        // Restore original terminal mode. Nothing can be done on failure here
        let _ = termios::tcsetattr(self.stdin.as_raw_fd(), termios::TCSAFLUSH, &self.orig);
    }
}

fn read_one<R: Read>(mut r: R) -> Result<Option<u8>> {
    let mut one_byte: [u8; 1] = [0];
    match r.read(&mut one_byte) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(one_byte[0])),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl ByteSource for StdinRawMode {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        read_one(self.stdin.lock())
    }
}

/// Adapts any reader to `ByteSource`. End of input is reported as a timeout.
pub struct ReadBytes<R: Read>(pub R);

impl<R: Read> ByteSource for ReadBytes<R> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        read_one(&mut self.0)
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum KeySeq {
    Unidentified, // Nothing arrived within the read timeout
    Key(u8),
    LeftKey,
    RightKey,
    UpKey,
    DownKey,
    PageUpKey,
    PageDownKey,
    HomeKey,
    EndKey,
    DeleteKey,
    BackspaceKey,
    EscapeKey,
}

impl fmt::Display for KeySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use KeySeq::*;
        match self {
            Unidentified => write!(f, "UNKNOWN"),
            Key(b' ') => write!(f, "SPACE"),
            Key(b) if b.is_ascii_control() || !b.is_ascii() => write!(f, "\\x{:x}", b),
            Key(b) => write!(f, "{}", *b as char),
            LeftKey => write!(f, "LEFT"),
            RightKey => write!(f, "RIGHT"),
            UpKey => write!(f, "UP"),
            DownKey => write!(f, "DOWN"),
            PageUpKey => write!(f, "PAGEUP"),
            PageDownKey => write!(f, "PAGEDOWN"),
            HomeKey => write!(f, "HOME"),
            EndKey => write!(f, "END"),
            DeleteKey => write!(f, "DELETE"),
            BackspaceKey => write!(f, "BACKSPACE"),
            EscapeKey => write!(f, "ESC"),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct InputSeq {
    pub key: KeySeq,
    pub ctrl: bool,
}

impl InputSeq {
    pub fn new(key: KeySeq) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: KeySeq) -> Self {
        Self { key, ctrl: true }
    }
}

impl fmt::Display for InputSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "C-")?;
        }
        write!(f, "{}", self.key)
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
enum DecodeState {
    Idle,
    // Bytes read so far after ESC
    InEscape { seq: [u8; 3], len: usize },
}

/// Reassembles escape sequences into keys one byte at a time. `feed` returns `None` while more
/// bytes are needed to decide the key.
#[derive(Debug)]
pub struct KeyDecoder {
    state: DecodeState,
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self {
            state: DecodeState::Idle,
        }
    }
}

impl KeyDecoder {
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::Idle
    }

    pub fn feed(&mut self, byte: Option<u8>) -> Option<InputSeq> {
        match self.state {
            DecodeState::Idle => match byte {
                None => Some(InputSeq::new(KeySeq::Unidentified)),
                Some(0x1b) => {
                    self.state = DecodeState::InEscape {
                        seq: [0; 3],
                        len: 0,
                    };
                    None
                }
                Some(b) => Some(Self::decode_byte(b)),
            },
            DecodeState::InEscape { mut seq, len } => {
                let b = match byte {
                    Some(b) => b,
                    None => {
                        // ESC not followed by sequence within timeout is a bare ESC key
                        self.state = DecodeState::Idle;
                        return Some(InputSeq::new(KeySeq::EscapeKey));
                    }
                };
                seq[len] = b;
                let len = len + 1;
                match Self::decode_escape_sequence(&seq[..len]) {
                    Some(key) => {
                        self.state = DecodeState::Idle;
                        trace!(target: "input", ?key, "escape sequence decoded");
                        Some(InputSeq::new(key))
                    }
                    None => {
                        self.state = DecodeState::InEscape { seq, len };
                        None
                    }
                }
            }
        }
    }

    fn decode_byte(b: u8) -> InputSeq {
        use KeySeq::*;
        match b {
            0x7f => InputSeq::new(BackspaceKey),
            // 0x00~0x1f keys are ascii keys with ctrl. Ctrl mod masks key with 0b11111.
            // Here unmask it with 0b1100000. It only works with 0x61~0x7f.
            0x00..=0x1f => InputSeq::ctrl(Key(b | 0b0110_0000)),
            _ => InputSeq::new(Key(b)),
        }
    }

    // Returns None when more bytes are needed. Sequences which are not recognized degrade to
    // a bare ESC key.
    fn decode_escape_sequence(seq: &[u8]) -> Option<KeySeq> {
        use KeySeq::*;
        match seq {
            [_] => None,
            [b'[', b'0'..=b'9'] => None,
            [b'[', b'A'] => Some(UpKey),
            [b'[', b'B'] => Some(DownKey),
            [b'[', b'C'] => Some(RightKey),
            [b'[', b'D'] => Some(LeftKey),
            [b'[', b'H'] | [b'O', b'H'] => Some(HomeKey),
            [b'[', b'F'] | [b'O', b'F'] => Some(EndKey),
            // e.g. \x1b[5~
            [b'[', d, b'~'] => Some(match d {
                b'1' | b'7' => HomeKey,
                b'4' | b'8' => EndKey,
                b'3' => DeleteKey,
                b'5' => PageUpKey,
                b'6' => PageDownKey,
                _ => EscapeKey,
            }),
            _ => Some(EscapeKey),
        }
    }
}

pub struct InputSequences<S: ByteSource> {
    source: S,
    decoder: KeyDecoder,
}

impl<S: ByteSource> InputSequences<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            decoder: KeyDecoder::default(),
        }
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn read_seq(&mut self) -> Result<InputSeq> {
        loop {
            let b = self.source.read_byte()?;
            if let Some(seq) = self.decoder.feed(b) {
                return Ok(seq);
            }
        }
    }
}

impl<S: ByteSource> Iterator for InputSequences<S> {
    type Item = Result<InputSeq>;

    // Read next key with timeout. If nothing was read, it returns KeySeq::Unidentified.
    // This method never returns None so for loop never ends
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.read_seq())
    }
}
