use anyhow::{Context, Result, anyhow, bail};
use log::{debug, trace, warn};
use std::{
    io::{self, Write},
    process::{Command, Stdio},
};

/// Clipboard helpers tried in order; the first one that accepts the text wins.
#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(windows)]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", windows)))]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<()>;
}

/// Copies through the platform's clipboard command line tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut last_error = None;
        for (program, args) in CLIPBOARD_COMMANDS {
            match pipe_into(program, args, text) {
                Ok(()) => {
                    debug!("Copied {} bytes using {}", text.len(), program);
                    return Ok(());
                }
                Err(e) => {
                    trace!("Clipboard tool {} failed: {:#}", program, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow!("No clipboard tool available")))
    }
}

fn pipe_into(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to start {}", program))?;

    // Dropping stdin closes the pipe so the tool sees EOF
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).with_context(|| format!("Failed to write to {}", program))?;
    }

    let status = child.wait().with_context(|| format!("Failed to wait for {}", program))?;
    if !status.success() {
        bail!("{} exited with {}", program, status);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivered {
    Clipboard,
    Stdout,
}

/// Sends `text` to the clipboard, or to `out` when `to_stdout` is set or the
/// clipboard is unavailable.
pub fn deliver<C, W>(text: &str, clipboard: &C, to_stdout: bool, out: &mut W) -> io::Result<Delivered>
where
    C: Clipboard + ?Sized,
    W: Write,
{
    if !to_stdout {
        match clipboard.copy(text) {
            Ok(()) => return Ok(Delivered::Clipboard),
            Err(e) => warn!("❌ Clipboard access failed ({:#}). Writing to stdout instead", e),
        }
    }

    out.write_all(text.as_bytes())?;
    if !text.is_empty() && !text.ends_with('\n') {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(Delivered::Stdout)
}
