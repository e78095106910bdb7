use std::fmt;
use std::io::Write;
use std::process::{Child, Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardError(pub String);

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ClipboardError {}

/// Destination for copied replies.
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Writes through the platform's clipboard command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        copy_to_clipboard(text)
    }
}

pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    #[cfg(target_os = "macos")]
    {
        run_with_stdin("pbcopy", &[], text)
    }
    #[cfg(target_os = "windows")]
    {
        run_with_stdin("cmd", &["/C", "clip"], text)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        const CANDIDATES: [(&str, &[&str]); 3] = [
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
            ("xsel", &["--clipboard", "--input"]),
        ];
        for (cmd, args) in CANDIDATES {
            if run_with_stdin(cmd, args, text).is_ok() {
                return Ok(());
            }
        }
        Err(ClipboardError(
            "No clipboard command found (install wl-copy, xclip, or xsel)".to_string(),
        ))
    }
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), ClipboardError> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| ClipboardError(format!("Clipboard command `{cmd}` not available")))?;

    feed_and_wait(&mut child, cmd, input)
}

/// Write `input` to the child's stdin and wait for it. The child is always
/// reaped, and killed first if it stopped reading.
fn feed_and_wait(child: &mut Child, cmd: &str, input: &str) -> Result<(), ClipboardError> {
    let written = match child.stdin.take() {
        // Dropping stdin closes the pipe so the command sees EOF.
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Ok(()),
    };

    if let Err(err) = written {
        let _ = child.kill();
        let _ = child.wait();
        return Err(ClipboardError(format!("Writing to `{cmd}` failed: {err}")));
    }

    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        _ => Err(ClipboardError(format!("Clipboard command `{cmd}` failed"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_command_is_reported() {
        let err = run_with_stdin("gemchat-no-such-clipboard-tool", &[], "x").expect_err("missing");
        assert!(err.to_string().contains("not available"));
    }

    #[cfg(unix)]
    #[test]
    fn child_that_stops_reading_is_reaped() {
        let mut child = Command::new("sh")
            .args(["-c", "exec 0<&-; exec sleep 30"])
            .stdin(Stdio::piped())
            .spawn()
            .expect("spawn sh");
        let input = "x".repeat(1 << 20);

        let err = feed_and_wait(&mut child, "sh", &input).expect_err("broken pipe");

        assert!(err.to_string().contains("Writing to `sh` failed"));
        assert!(child.try_wait().expect("try_wait").is_some());
    }
}
