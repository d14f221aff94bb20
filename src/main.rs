use clap::Parser;
use sanky_editor::{get_window_size_fallback, Config, Editor, StdinRawMode};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// A small screen-oriented text editor for Unix-like terminals.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// File to edit. A path which does not exist is created on save
    file: Option<PathBuf>,

    /// Number of columns a tab character advances to
    #[arg(long, default_value_t = Config::default().tab_stop)]
    tab_stop: usize,

    /// Ctrl-Q presses required to quit with unsaved changes
    #[arg(long, default_value_t = Config::default().quit_times)]
    quit_times: usize,

    /// Read timeout of key input in 1/10 seconds
    #[arg(long, default_value_t = 1)]
    read_timeout: u8,

    /// Write logs to the file. SANKY_LOG environment variable is also looked
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
}

fn setup_logging(path: Option<PathBuf>) -> io::Result<()> {
    let path = match path.or_else(|| std::env::var_os("SANKY_LOG").map(PathBuf::from)) {
        Some(p) => p,
        None => return Ok(()), // Screen is owned by editor. Never log to terminal
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Ignore error when global subscriber is already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn run(args: Args) -> sanky_editor::Result<()> {
    setup_logging(args.log)?;

    let config = Config::default()
        .tab_stop(args.tab_stop)
        .quit_times(args.quit_times)
        .read_timeout_ds(args.read_timeout);

    let mut input = StdinRawMode::new(config.read_timeout_ds)?.input_keys();
    let window_size = match term_size::dimensions_stdout() {
        Some(size) => size,
        None => get_window_size_fallback(input.source_mut(), io::stdout())?,
    };

    let mut editor = match args.file {
        Some(path) => Editor::open(path, input, io::stdout(), window_size, config)?,
        None => Editor::new(input, io::stdout(), window_size, config)?,
    };
    let result = editor.edit();
    editor.clear_screen()?; // Finally clear screen on exit
    result
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        // Raw mode is already restored since the editor was dropped
        eprintln!("Error: {}", err);
        exit(1);
    }
}
