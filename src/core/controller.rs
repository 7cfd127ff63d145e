//! The send/receive state machine for one chat session.
//!
//! The controller is synchronous: the event loop dispatches intents
//! (`begin_send`, `begin_end_session`, ...) and later feeds back the
//! network result (`complete_send`, `complete_end_session`). Keeping the
//! network out of the state machine is what makes the whole flow
//! testable without a server.
//!
//! Phases:
//!
//! ```text
//! Idle --begin_send--> Sending --ok--> Idle (reply appended)
//!                              --401--> LoggedOut
//!                              --err--> Idle (canned apology appended)
//! Idle --begin_end_session--> EndingSession --ok--> SessionEnded
//!                                           --err--> Idle (logged only)
//! SessionEnded --acknowledge--> Idle (fresh session)
//! ```
//!
//! `Sending` doubles as the typing guard: while a send is outstanding,
//! further sends are suppressed.

use crate::api::ApiError;
use crate::core::message::{Role, Transcript};
use crate::core::session::{Session, SessionId};

/// Shown in place of a real reply when a chat turn fails; no retry.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting right now. Please check your connection and try again.";

const CLOSING_PHRASES: [&str; 4] = ["bye", "goodbye", "see you", "end session"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
    EndingSession,
    SessionEnded,
    LoggedOut,
}

/// A user turn ready to go over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTurn {
    pub session_id: SessionId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Reply appended, back to idle.
    Replied,
    /// Reply appended and the user's message contained a closing phrase;
    /// the caller should start the end-of-session flow.
    Farewell,
    /// The turn failed; the canned apology was appended instead.
    Degraded,
    /// The backend returned 401; the client-side identity must be cleared.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// The session concluded with a server-produced summary.
    Summary(String),
    /// The session was reset without a summary (simple backend).
    Reset,
    /// Ending failed; the prior state is unchanged.
    Unchanged,
}

pub struct ChatController {
    phase: Phase,
    session: Option<Session>,
    transcript: Transcript,
}

impl ChatController {
    /// Start with a fresh session, mirroring the page-load behavior of
    /// the original client.
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            session: Some(Session::new()),
            transcript: Transcript::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// True while a send or session-end call is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Sending | Phase::EndingSession)
    }

    /// Append an app-authored note to the transcript.
    pub fn note(&mut self, content: impl Into<String>) {
        self.transcript.push(Role::AppInfo, content);
    }

    /// Accept user input for sending. Returns `None` (a no-op) for empty
    /// input or whenever a prior send is still outstanding.
    pub fn begin_send(&mut self, input: &str) -> Option<OutboundTurn> {
        let content = input.trim();
        if content.is_empty() || self.phase != Phase::Idle {
            return None;
        }
        let session_id = match &self.session {
            Some(session) => session.id.clone(),
            None => {
                let session = Session::new();
                let id = session.id.clone();
                self.session = Some(session);
                id
            }
        };
        self.transcript.push(Role::User, content);
        self.phase = Phase::Sending;
        Some(OutboundTurn {
            session_id,
            content: content.to_string(),
        })
    }

    /// Feed back the result of the outstanding send.
    pub fn complete_send(&mut self, sent: &str, result: Result<String, ApiError>) -> SendOutcome {
        debug_assert_eq!(self.phase, Phase::Sending);
        match result {
            Ok(reply) => {
                self.transcript.push(Role::Counselor, reply);
                self.phase = Phase::Idle;
                if contains_closing_phrase(sent) {
                    SendOutcome::Farewell
                } else {
                    SendOutcome::Replied
                }
            }
            Err(ApiError::SessionExpired) => {
                self.phase = Phase::LoggedOut;
                self.session = None;
                SendOutcome::Expired
            }
            Err(err) => {
                tracing::debug!(error = %err, "chat turn failed");
                self.transcript.push(Role::Counselor, FALLBACK_REPLY);
                self.phase = Phase::Idle;
                SendOutcome::Degraded
            }
        }
    }

    /// Start the end-of-session flow. A no-op unless idle with an active
    /// session.
    pub fn begin_end_session(&mut self) -> Option<SessionId> {
        if self.phase != Phase::Idle {
            return None;
        }
        let id = self.session.as_ref()?.id.clone();
        self.phase = Phase::EndingSession;
        Some(id)
    }

    /// Feed back the result of the summarization (or reset) call.
    ///
    /// Failures are logged, never surfaced: the user is left in the
    /// unchanged prior state.
    pub fn complete_end_session(
        &mut self,
        result: Result<Option<String>, ApiError>,
    ) -> EndOutcome {
        debug_assert_eq!(self.phase, Phase::EndingSession);
        match result {
            Ok(Some(summary)) => {
                self.session = None;
                self.phase = Phase::SessionEnded;
                EndOutcome::Summary(summary)
            }
            Ok(None) => {
                self.session = Some(Session::new());
                self.phase = Phase::Idle;
                self.note("Conversation reset. A new session has begun.");
                EndOutcome::Reset
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to end session");
                self.phase = Phase::Idle;
                EndOutcome::Unchanged
            }
        }
    }

    /// Dismiss the summary and start a fresh session.
    pub fn acknowledge_session_end(&mut self) {
        if self.phase == Phase::SessionEnded {
            self.session = Some(Session::new());
            self.phase = Phase::Idle;
        }
    }

    /// Terminal for the client-side identity; reachable from any phase.
    pub fn logout(&mut self) {
        self.session = None;
        self.phase = Phase::LoggedOut;
    }
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive, word-boundary match of the closing phrases that
/// trigger the end-of-session flow.
pub fn contains_closing_phrase(input: &str) -> bool {
    let lowered = input.to_lowercase();
    CLOSING_PHRASES
        .iter()
        .any(|phrase| contains_word(&lowered, phrase))
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    for (start, _) in haystack.match_indices(needle) {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[start + needle.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    fn controller_with_turn(input: &str) -> (ChatController, OutboundTurn) {
        let mut controller = ChatController::new();
        let turn = controller.begin_send(input).expect("turn dispatched");
        (controller, turn)
    }

    #[test]
    fn empty_input_is_not_sent() {
        let mut controller = ChatController::new();
        assert!(controller.begin_send("   ").is_none());
        assert!(controller.transcript().is_empty());
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn send_while_sending_is_suppressed() {
        let (mut controller, _turn) = controller_with_turn("hello");
        assert_eq!(controller.phase(), Phase::Sending);

        assert!(controller.begin_send("second message").is_none());
        assert_eq!(controller.transcript().len(), 1);

        controller.complete_send("hello", Ok("hi there".to_string()));
        assert!(controller.begin_send("second message").is_some());
    }

    #[test]
    fn successful_turn_appends_reply_in_order() {
        let (mut controller, turn) = controller_with_turn("I had a rough day");
        let outcome = controller.complete_send(&turn.content, Ok("Tell me more.".to_string()));

        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(controller.phase(), Phase::Idle);
        let messages = controller.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "I had a rough day");
        assert_eq!(messages[1].role, Role::Counselor);
        assert_eq!(messages[1].content, "Tell me more.");
    }

    #[test]
    fn failed_turn_degrades_to_fallback_reply() {
        let (mut controller, turn) = controller_with_turn("hello");
        let outcome = controller.complete_send(
            &turn.content,
            Err(ApiError::Network("connection refused".to_string())),
        );

        assert_eq!(outcome, SendOutcome::Degraded);
        assert_eq!(controller.phase(), Phase::Idle);
        let last = controller.transcript().messages().last().expect("reply");
        assert_eq!(last.role, Role::Counselor);
        assert_eq!(last.content, FALLBACK_REPLY);
    }

    #[test]
    fn expired_token_logs_the_session_out() {
        let (mut controller, turn) = controller_with_turn("hello");
        let outcome = controller.complete_send(&turn.content, Err(ApiError::SessionExpired));

        assert_eq!(outcome, SendOutcome::Expired);
        assert_eq!(controller.phase(), Phase::LoggedOut);
        assert!(controller.active_session().is_none());
        assert!(controller.begin_send("anything").is_none());
    }

    #[test]
    fn farewell_is_reported_after_the_reply() {
        let (mut controller, turn) = controller_with_turn("ok bye");
        let outcome = controller.complete_send(&turn.content, Ok("Take care!".to_string()));
        assert_eq!(outcome, SendOutcome::Farewell);
        // The reply still landed before the end-of-session flow starts.
        assert_eq!(controller.transcript().len(), 2);
    }

    #[test]
    fn near_miss_is_not_a_farewell() {
        let (mut controller, turn) = controller_with_turn("ok buy");
        let outcome = controller.complete_send(&turn.content, Ok("Sure.".to_string()));
        assert_eq!(outcome, SendOutcome::Replied);
    }

    #[test]
    fn end_session_yields_summary_and_clears_the_session() {
        let (mut controller, turn) = controller_with_turn("goodbye");
        controller.complete_send(&turn.content, Ok("Bye!".to_string()));

        let session_id = controller.begin_end_session().expect("ending");
        assert_eq!(controller.phase(), Phase::EndingSession);
        assert!(!session_id.as_str().is_empty());

        let outcome =
            controller.complete_end_session(Ok(Some("We talked about work.".to_string())));
        assert_eq!(outcome, EndOutcome::Summary("We talked about work.".to_string()));
        assert_eq!(controller.phase(), Phase::SessionEnded);
        assert!(controller.active_session().is_none());
    }

    #[test]
    fn acknowledging_the_summary_starts_a_fresh_session() {
        let mut controller = ChatController::new();
        let first_id = controller.active_session().expect("session").id.clone();
        controller.begin_end_session().expect("ending");
        controller.complete_end_session(Ok(Some("Summary.".to_string())));

        controller.acknowledge_session_end();
        assert_eq!(controller.phase(), Phase::Idle);
        let second_id = &controller.active_session().expect("session").id;
        assert_ne!(&first_id, second_id);
    }

    #[test]
    fn failed_end_session_returns_to_the_prior_state() {
        let mut controller = ChatController::new();
        let session_id = controller.active_session().expect("session").id.clone();
        controller.begin_end_session().expect("ending");

        let outcome = controller
            .complete_end_session(Err(ApiError::Network("timeout".to_string())));
        assert_eq!(outcome, EndOutcome::Unchanged);
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.active_session().expect("session").id, session_id);
    }

    #[test]
    fn reset_backend_starts_a_fresh_session_without_summary() {
        let mut controller = ChatController::new();
        let first_id = controller.active_session().expect("session").id.clone();
        controller.begin_end_session().expect("ending");

        let outcome = controller.complete_end_session(Ok(None));
        assert_eq!(outcome, EndOutcome::Reset);
        assert_eq!(controller.phase(), Phase::Idle);
        assert_ne!(controller.active_session().expect("session").id, first_id);
        let last = controller.transcript().messages().last().expect("note");
        assert_eq!(last.role, Role::AppInfo);
    }

    #[test]
    fn end_session_is_suppressed_while_sending() {
        let (mut controller, _turn) = controller_with_turn("hello");
        assert!(controller.begin_end_session().is_none());
    }

    #[test]
    fn logout_is_terminal_from_any_phase() {
        let (mut controller, _turn) = controller_with_turn("hello");
        controller.logout();
        assert_eq!(controller.phase(), Phase::LoggedOut);
        assert!(controller.active_session().is_none());
    }

    #[test]
    fn closing_phrases_match_on_word_boundaries() {
        assert!(contains_closing_phrase("ok bye"));
        assert!(contains_closing_phrase("BYE"));
        assert!(contains_closing_phrase("Goodbye, and thanks"));
        assert!(contains_closing_phrase("see you next week"));
        assert!(contains_closing_phrase("let's end session here"));
        assert!(!contains_closing_phrase("ok buy"));
        assert!(!contains_closing_phrase("goodbyes are hard"));
        assert!(!contains_closing_phrase("I went to the seaside"));
    }
}
