//! The chat session controller.
//!
//! [`ChatController`] is the only writer of the shared [`App`]: the UI forwards
//! gestures to it and repaints when it receives a [`SessionEvent`]. A submit is
//! split in two phases. [`ChatController::accept`] runs on the caller's task and
//! records the prompt synchronously; [`ChatController::drive_turn`] waits for
//! the provider and reveals the reply, and is meant to run on its own task.
//!
//! [`App`]: crate::core::app::App

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::core::app::AppHandle;
use crate::core::message::MessageId;
use crate::core::provider::TextProvider;
use crate::core::reveal::{run_reveal, RevealOutcome, RevealSettings};
use crate::core::session::{ReplyStep, TurnId, TurnTicket};
use crate::ui::theme::ThemeMode;
use crate::utils::clipboard::Clipboard;


/// Notifications for the render surface. Every variant means "repaint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    MessageAppended(MessageId),
    ContentRevealed { id: MessageId, content: String },
    TurnFinished { turn_id: TurnId, outcome: TurnOutcome },
    Cleared,
    ThemeChanged(ThemeMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Answered(MessageId),
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty or whitespace-only prompt; nothing happened.
    Ignored,
    /// A previous turn is still in flight; nothing happened.
    Busy,
    Finished(TurnOutcome),
}

/// A prompt that has been recorded and is waiting for its reply.
#[derive(Debug)]
pub struct AcceptedTurn {
    prompt: String,
    ticket: TurnTicket,
}

#[derive(Clone)]
pub struct ChatController {
    app: AppHandle,
    provider: Arc<dyn TextProvider>,
    clipboard: Arc<dyn Clipboard>,
    reveal: RevealSettings,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl ChatController {
    pub fn new(
        app: AppHandle,
        provider: Arc<dyn TextProvider>,
        clipboard: Arc<dyn Clipboard>,
        reveal: RevealSettings,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                app,
                provider,
                clipboard,
                reveal,
                events,
            },
            rx,
        )
    }

    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    fn emit(&self, event: SessionEvent) {
        // The UI may already be gone during shutdown.
        let _ = self.events.send(event);
    }

    /// Run a whole turn: record the prompt, wait for the reply, reveal it.
    pub async fn submit(&self, prompt: impl Into<String>) -> SubmitOutcome {
        match self.accept(prompt).await {
            Ok(turn) => SubmitOutcome::Finished(self.drive_turn(turn).await),
            Err(outcome) => outcome,
        }
    }

    /// Record the prompt and hand the rest of the turn to a background task.
    pub async fn spawn_submit(
        &self,
        prompt: impl Into<String>,
    ) -> Result<JoinHandle<TurnOutcome>, SubmitOutcome> {
        let turn = self.accept(prompt).await?;
        let controller = self.clone();
        Ok(tokio::spawn(async move { controller.drive_turn(turn).await }))
    }

    /// Append the user's message and clear the input. Fails without touching
    /// any state for blank prompts or while another turn is in flight.
    pub async fn accept(&self, prompt: impl Into<String>) -> Result<AcceptedTurn, SubmitOutcome> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(SubmitOutcome::Ignored);
        }

        let ticket = self
            .app
            .update(|app| {
                let ticket = app.session.begin_turn(prompt.clone())?;
                app.ui.clear_input();
                app.ui.follow_latest();
                Some(ticket)
            })
            .await;

        match ticket {
            Some(ticket) => {
                debug!(turn = ticket.turn_id, "prompt accepted");
                self.emit(SessionEvent::MessageAppended(ticket.user_message_id));
                Ok(AcceptedTurn { prompt, ticket })
            }
            None => {
                debug!("prompt rejected while a turn is in flight");
                Err(SubmitOutcome::Busy)
            }
        }
    }

    /// Wait for the provider and reveal its reply into the transcript.
    pub async fn drive_turn(&self, turn: AcceptedTurn) -> TurnOutcome {
        let AcceptedTurn { prompt, ticket } = turn;
        let TurnTicket {
            turn_id,
            cancel_token,
            ..
        } = ticket;

        let result = tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!(turn = turn_id, "turn cancelled while awaiting provider");
                return TurnOutcome::Cancelled;
            }
            result = self.provider.generate(&prompt) => result,
        };

        let text = match result {
            Ok(text) => text,
            Err(err) => {
                error!(turn = turn_id, model = self.provider.model(), "provider failure: {err}");
                let closed = self
                    .app
                    .update(|app| {
                        let closed = app.session.fail_turn(turn_id);
                        if closed {
                            app.ui.follow_latest();
                        }
                        closed
                    })
                    .await;
                if !closed {
                    return TurnOutcome::Cancelled;
                }
                self.emit(SessionEvent::TurnFinished {
                    turn_id,
                    outcome: TurnOutcome::Failed,
                });
                return TurnOutcome::Failed;
            }
        };

        let opened = self
            .app
            .update(|app| {
                let id = app.session.open_reply(turn_id)?;
                app.ui.follow_latest();
                Some(id)
            })
            .await;
        let Some(reply_id) = opened else {
            return TurnOutcome::Cancelled;
        };
        self.emit(SessionEvent::MessageAppended(reply_id));

        let app = self.app.clone();
        let events = self.events.clone();
        let outcome = run_reveal(&text, self.reveal, &cancel_token, |prefix| {
            let app = app.clone();
            let events = events.clone();
            async move {
                let event_content = prefix.clone();
                let applied = app
                    .update(|app| {
                        let applied = app.session.set_content(reply_id, prefix);
                        if applied {
                            app.ui.follow_latest();
                        }
                        applied
                    })
                    .await;
                if applied {
                    let _ = events.send(SessionEvent::ContentRevealed {
                        id: reply_id,
                        content: event_content,
                    });
                }
                applied
            }
        })
        .await;

        if outcome != RevealOutcome::Completed {
            debug!(turn = turn_id, ?outcome, "reveal ended early");
            return TurnOutcome::Cancelled;
        }

        let closed = self.app.update(|app| app.session.finish_turn(turn_id)).await;
        if !closed {
            return TurnOutcome::Cancelled;
        }

        debug!(turn = turn_id, chars = text.chars().count(), "reply revealed");
        let outcome = TurnOutcome::Answered(reply_id);
        self.emit(SessionEvent::TurnFinished { turn_id, outcome });
        outcome
    }

    /// Drop the transcript, cancelling whatever turn is in flight.
    pub async fn new_chat(&self) {
        self.app
            .update(|app| {
                app.session.clear();
                app.ui.select_reply(None);
                app.ui.reset_scroll();
            })
            .await;
        self.emit(SessionEvent::Cleared);
    }

    /// Copy the content of a completed assistant reply to the clipboard.
    /// Anything else is ignored; clipboard failures are only logged.
    pub async fn copy(&self, id: MessageId) {
        let content = self
            .app
            .read(|app| {
                app.session
                    .message(id)
                    .filter(|message| message.is_complete_reply())
                    .map(|message| message.content.clone())
            })
            .await;

        match content {
            Some(content) => self.write_clipboard(content).await,
            None => debug!(message = %id, "copy ignored: not a completed reply"),
        }
    }

    /// Copy the newest completed reply, if any.
    pub async fn copy_latest_reply(&self) {
        let latest = self
            .app
            .read(|app| app.session.latest_complete_reply().map(|m| m.id))
            .await;
        if let Some(id) = latest {
            self.copy(id).await;
        }
    }

    /// Move the copy target through the completed replies. Returns the new
    /// selection; `None` means copy falls back to the newest reply.
    pub async fn select_reply(&self, step: ReplyStep) -> Option<MessageId> {
        self.app
            .update(|app| {
                let next = app.session.neighbor_reply(app.ui.selected_reply, step);
                app.ui.select_reply(next);
                next
            })
            .await
    }

    pub async fn clear_reply_selection(&self) {
        self.app.update(|app| app.ui.select_reply(None)).await;
    }

    /// Copy the selected reply, or the newest one when nothing is selected.
    pub async fn copy_selected_reply(&self) {
        let selected = self.app.read(|app| app.ui.selected_reply).await;
        match selected {
            Some(id) => self.copy(id).await,
            None => self.copy_latest_reply().await,
        }
    }

    async fn write_clipboard(&self, content: String) {
        let clipboard = Arc::clone(&self.clipboard);
        let result = tokio::task::spawn_blocking(move || clipboard.set_text(&content)).await;
        match result {
            Ok(Ok(())) => debug!("reply copied to clipboard"),
            Ok(Err(err)) => warn!("clipboard write failed: {err}"),
            Err(err) => warn!("clipboard task failed: {err}"),
        }
    }

    pub async fn toggle_theme(&self) -> ThemeMode {
        let mode = self
            .app
            .update(|app| {
                let mode = app.ui.theme_mode.toggled();
                app.ui.set_theme_mode(mode);
                mode
            })
            .await;
        self.emit(SessionEvent::ThemeChanged(mode));
        mode
    }

    /// Cancel any turn still running. Called when the UI exits.
    pub async fn shutdown(&self) {
        self.app.update(|app| app.session.cancel_active_turn()).await;
    }
}
