//! Conversation state for a single chat session.
//!
//! [`Session`] is the only owner of the transcript. Every mutation goes through
//! one of its methods so that turn bookkeeping (which reply is being revealed,
//! which cancellation token belongs to it) stays consistent with the message
//! list.

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::core::message::{Message, MessageId, MessageStatus};

/// Identifies one submit → reply cycle. Late updates carrying an old turn id
/// are dropped.
pub type TurnId = u64;

#[derive(Debug)]
struct ActiveTurn {
    id: TurnId,
    cancel_token: CancellationToken,
    user_message_id: MessageId,
    reply_id: Option<MessageId>,
}

/// Handle returned to the task that drives a turn.
#[derive(Debug, Clone)]
pub struct TurnTicket {
    pub turn_id: TurnId,
    pub cancel_token: CancellationToken,
    pub user_message_id: MessageId,
}

/// Direction for moving through completed replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStep {
    Older,
    Newer,
}

#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<Message>,
    active_turn: Option<ActiveTurn>,
    next_turn_id: TurnId,
    last_message_id: i64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// True while a provider call or reveal is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.active_turn.is_some()
    }

    /// True while the provider has not answered yet (no reply bubble exists).
    pub fn is_awaiting_response(&self) -> bool {
        self.active_turn
            .as_ref()
            .is_some_and(|turn| turn.reply_id.is_none())
    }

    pub fn latest_complete_reply(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_complete_reply())
    }

    /// The completed reply one `step` away from `from`. Without a starting
    /// point, stepping older lands on the newest reply. Stepping older from
    /// the oldest stays put; stepping newer from the newest yields `None`.
    pub fn neighbor_reply(&self, from: Option<MessageId>, step: ReplyStep) -> Option<MessageId> {
        let replies: Vec<MessageId> = self
            .messages
            .iter()
            .filter(|m| m.is_complete_reply())
            .map(|m| m.id)
            .collect();
        let position = from.and_then(|id| replies.iter().position(|reply| *reply == id));

        match (position, step) {
            (None, ReplyStep::Older) => replies.last().copied(),
            (None, ReplyStep::Newer) => None,
            (Some(index), ReplyStep::Older) => replies.get(index.saturating_sub(1)).copied(),
            (Some(index), ReplyStep::Newer) => replies.get(index + 1).copied(),
        }
    }

    /// Timestamp-derived ids, bumped when the clock has not moved past the
    /// previous id.
    fn allocate_id(&mut self) -> MessageId {
        let now = Utc::now().timestamp_millis();
        let raw = now.max(self.last_message_id + 1);
        self.last_message_id = raw;
        MessageId::new(raw)
    }

    /// Append the user's prompt and open a new turn. Returns `None` when a turn
    /// is already in flight; the transcript is left untouched in that case.
    pub fn begin_turn(&mut self, prompt: impl Into<String>) -> Option<TurnTicket> {
        if self.active_turn.is_some() {
            return None;
        }

        let user_message_id = self.allocate_id();
        self.messages.push(Message::user(user_message_id, prompt));

        self.next_turn_id += 1;
        let turn_id = self.next_turn_id;
        let cancel_token = CancellationToken::new();
        self.active_turn = Some(ActiveTurn {
            id: turn_id,
            cancel_token: cancel_token.clone(),
            user_message_id,
            reply_id: None,
        });

        Some(TurnTicket {
            turn_id,
            cancel_token,
            user_message_id,
        })
    }

    fn current_turn_mut(&mut self, turn_id: TurnId) -> Option<&mut ActiveTurn> {
        self.active_turn
            .as_mut()
            .filter(|turn| turn.id == turn_id)
    }

    /// Append the empty assistant reply for `turn_id`.
    pub fn open_reply(&mut self, turn_id: TurnId) -> Option<MessageId> {
        self.current_turn_mut(turn_id)?;
        let reply_id = self.allocate_id();
        if let Some(turn) = self.current_turn_mut(turn_id) {
            turn.reply_id = Some(reply_id);
        }
        self.messages.push(Message::pending_assistant(reply_id));
        Some(reply_id)
    }

    /// Replace the content of message `id`. Returns `false` when the message is
    /// gone, for instance after the chat was cleared.
    pub fn set_content(&mut self, id: MessageId, content: impl Into<String>) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Close `turn_id` after a successful reveal.
    pub fn finish_turn(&mut self, turn_id: TurnId) -> bool {
        let Some(turn) = self.take_turn(turn_id) else {
            return false;
        };
        if let Some(reply_id) = turn.reply_id {
            self.set_status(reply_id, MessageStatus::Complete);
        }
        true
    }

    /// Close `turn_id` after a provider failure, marking the prompt as
    /// unanswered.
    pub fn fail_turn(&mut self, turn_id: TurnId) -> bool {
        let Some(turn) = self.take_turn(turn_id) else {
            return false;
        };
        self.set_status(turn.user_message_id, MessageStatus::Unanswered);
        true
    }

    /// Drop the whole transcript and cancel any outstanding turn.
    pub fn clear(&mut self) {
        self.cancel_active_turn();
        self.messages.clear();
    }

    pub fn cancel_active_turn(&mut self) {
        if let Some(turn) = self.active_turn.take() {
            turn.cancel_token.cancel();
        }
    }

    fn take_turn(&mut self, turn_id: TurnId) -> Option<ActiveTurn> {
        match &self.active_turn {
            Some(turn) if turn.id == turn_id => self.active_turn.take(),
            _ => None,
        }
    }

    fn set_status(&mut self, id: MessageId, status: MessageStatus) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            message.status = status;
        }
    }
}
