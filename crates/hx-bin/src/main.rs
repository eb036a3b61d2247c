//! Hexscope entrypoint: a serial terminal shell around the workbench
//! engine.
//!
//! The shell owns the one `Workbench`, reads a line at a time from stdin,
//! and keeps the standing view painted. Four inputs are shell-level
//! actions (`open`, `next`, `prev`, `quit`); everything else goes to the
//! engine's dispatcher verbatim. The engine is strictly synchronous (one
//! command runs to completion before the next line is read), so the shell
//! needs no event plumbing beyond this loop.

use anyhow::Result;
use clap::Parser;
use core_actions::{CommandResult, dispatch};
use core_config::Config;
use core_disasm::IcedDecoder;
use core_model::Workbench;
use core_render::compose_overview;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "hexscope", version, about = "Interactive binary workbench")] // minimal metadata
struct Args {
    /// Optional binary file to open at startup.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `hexscope.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

/// Inputs the shell handles itself; everything else is an engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellAction {
    Open(PathBuf),
    NextPage,
    PrevPage,
    Quit,
    Engine,
}

fn classify(line: &str) -> ShellAction {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return ShellAction::Engine;
    };
    match first.to_ascii_lowercase().as_str() {
        "open" => match core_bytes::rest_of_line(line, 1) {
            // Paths may contain spaces; take the raw remainder.
            Some(rest) => ShellAction::Open(PathBuf::from(rest.trim_end())),
            None => ShellAction::Engine,
        },
        "next" => ShellAction::NextPage,
        "prev" => ShellAction::PrevPage,
        "quit" | "exit" => ShellAction::Quit,
        _ => ShellAction::Engine,
    }
}

fn configure_logging(fallback_filter: &str) -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("hexscope.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "hexscope.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback_filter));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_err) => {
            // Global tracing subscriber already installed; drop guard so
            // the writer shuts down.
            None
        }
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Clear the screen and show `text` verbatim (it already carries `\r\n`
/// separators).
fn paint(text: &str) -> Result<()> {
    let mut out = io::stdout();
    execute!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    out.write_all(text.as_bytes())?;
    out.write_all(b"\r\n")?;
    out.flush()?;
    Ok(())
}

fn repaint_overview(workbench: &mut Workbench) -> Result<()> {
    workbench.normalize_page();
    let text = compose_overview(workbench);
    paint(&text)
}

fn status_line(text: &str) -> Result<()> {
    let mut out = io::stdout();
    out.write_all(b"* ")?;
    out.write_all(text.as_bytes())?;
    out.write_all(b"\r\n")?;
    out.flush()?;
    Ok(())
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let mut workbench = Workbench::new(Box::new(IcedDecoder::new()));
    workbench.set_vft_window(config.file.disasm.vft_window);

    if let Some(path) = args.path.as_ref()
        && let Err(e) = workbench.open(path)
    {
        error!(target: "runtime", file = %path.display(), %e, "startup_open_failed");
        status_line(&format!("open failed: {e}"))?;
    }
    repaint_overview(&mut workbench)?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        {
            let mut out = io::stdout();
            out.write_all(b"> ")?;
            out.flush()?;
        }
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim_end_matches(['\r', '\n']);
        match classify(input) {
            ShellAction::Quit => break,
            ShellAction::Open(path) => match workbench.open(&path) {
                Ok(()) => repaint_overview(&mut workbench)?,
                Err(e) => status_line(&format!("open failed: {e}"))?,
            },
            ShellAction::NextPage => {
                workbench.next_page();
                repaint_overview(&mut workbench)?;
            }
            ShellAction::PrevPage => {
                workbench.prev_page();
                repaint_overview(&mut workbench)?;
            }
            ShellAction::Engine => {
                let outcome = dispatch(input, &mut workbench);
                match outcome.result {
                    CommandResult::None => {}
                    CommandResult::RefreshStandingView => repaint_overview(&mut workbench)?,
                    CommandResult::ReplaceOutput(text) => paint(&text)?,
                }
                if let Some(status) = outcome.status {
                    status_line(&status)?;
                }
            }
        }
    }
    info!(target: "runtime", "shutdown");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = core_config::load_from(args.config.clone())?;
    let _log_guard = configure_logging(&config.file.log.filter);
    install_panic_hook();
    info!(target: "runtime", "startup");
    run(&args, &config)
}
