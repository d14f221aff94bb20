use std::time::Duration;

pub const DEFAULT_TAB_STOP: usize = 8;
pub const DEFAULT_QUIT_TIMES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    // Visual columns are aligned to multiples of this on tab expansion
    pub tab_stop: usize,
    // Consecutive Ctrl-Q presses required to quit with unsaved changes
    pub quit_times: usize,
    // How long a message stays in the message line
    pub message_timeout: Duration,
    // Read timeout of terminal input in 1/10 seconds (termios VTIME)
    pub read_timeout_ds: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            quit_times: DEFAULT_QUIT_TIMES,
            message_timeout: Duration::from_secs(5),
            read_timeout_ds: 1,
        }
    }
}

impl Config {
    pub fn tab_stop(mut self, tab_stop: usize) -> Self {
        self.tab_stop = tab_stop.max(1);
        self
    }

    pub fn quit_times(mut self, times: usize) -> Self {
        self.quit_times = times.max(1);
        self
    }

    pub fn read_timeout_ds(mut self, ds: u8) -> Self {
        self.read_timeout_ds = ds.max(1);
        self
    }
}
