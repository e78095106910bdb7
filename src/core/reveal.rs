//! Typewriter-style disclosure of a reply that is already complete.
//!
//! The provider returns the whole reply at once; the reveal hands it to the
//! transcript one character at a time with a fixed pause in between so the
//! terminal can repaint.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealSettings {
    pub char_delay: Duration,
}

impl RevealSettings {
    pub fn new(char_delay: Duration) -> Self {
        Self { char_delay }
    }

    /// No pause between characters. Used by tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self::new(DEFAULT_CHAR_DELAY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed,
    Cancelled,
    /// The message being revealed no longer exists.
    TargetGone,
}

/// Successive prefixes of `text`, one per character.
pub fn prefixes(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.char_indices()
        .map(move |(index, ch)| &text[..index + ch.len_utf8()])
}

/// Feed every prefix of `text` to `apply`, pausing `settings.char_delay`
/// between characters. `apply` returns `false` when its target has vanished,
/// which ends the reveal early.
pub async fn run_reveal<F, Fut>(
    text: &str,
    settings: RevealSettings,
    cancel_token: &CancellationToken,
    mut apply: F,
) -> RevealOutcome
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut frames = prefixes(text).peekable();
    while let Some(prefix) = frames.next() {
        if cancel_token.is_cancelled() {
            return RevealOutcome::Cancelled;
        }
        if !apply(prefix.to_string()).await {
            return RevealOutcome::TargetGone;
        }
        if frames.peek().is_none() {
            break;
        }

        if settings.char_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                _ = cancel_token.cancelled() => return RevealOutcome::Cancelled,
                _ = tokio::time::sleep(settings.char_delay) => {}
            }
        }
    }

    RevealOutcome::Completed
}
