//! Minicon demo
//!
//! Puts the terminal in cbreak mode, echoes the name of every key pressed
//! at the top-left of the screen, and quits on `q`. A `?` hotkey flips a
//! help line without ever reaching the main loop.
//!
//! ```bash
//! RUST_LOG=debug minicon-demo --cols 40 --rows 10
//! ```

use std::cell::Cell;
use std::process::ExitCode;
use std::rc::Rc;

use minicon::backend::UnixBackend;
use minicon::{Console, Key, Viewport};

/// Command-line arguments
#[derive(Default)]
struct Args {
    /// Viewport column override
    cols: Option<u16>,
    /// Viewport row override
    rows: Option<u16>,
    /// Show help
    help: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut argv = std::env::args().skip(1);
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--cols" => args.cols = argv.next().and_then(|v| v.parse().ok()),
            "--rows" => args.rows = argv.next().and_then(|v| v.parse().ok()),
            "--help" | "-h" => args.help = true,
            other => {
                eprintln!("unknown argument: {other}");
                args.help = true;
            }
        }
    }
    args
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    if args.help {
        eprintln!("usage: minicon-demo [--cols N] [--rows N]");
        eprintln!("echoes pressed keys; q quits, ? shows a hotkey line");
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> minicon::Result<()> {
    let mut backend = UnixBackend::new()?;
    if let (Some(cols), Some(rows)) = (args.cols, args.rows) {
        backend = backend.with_viewport(Viewport::new(cols, rows));
    }
    let mut console = Console::new(Box::new(backend));

    let help_requested = Rc::new(Cell::new(false));
    let flag = help_requested.clone();
    console.bind_hotkey(Key::Char('?'), move || flag.set(true));

    console.display(vec!["press keys to see their names", "q quits, ? for help", ""])?;

    loop {
        let key = console.get_key()?;
        if key == Key::Char('q') {
            return Ok(());
        }
        let name = format!("{:<29}", key.to_string());
        console.set_display(0, 0, name.as_str())?;
        if help_requested.replace(false) {
            console.set_display(0, 2, "hotkeys never reach the key loop")?;
        }
    }
}
