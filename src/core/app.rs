//! Runtime state for one chat view.
//!
//! `ChatApp` bundles the controller with the UI-side state the renderer
//! and command handlers need: the input line, scroll position, the
//! context/welcome banners, the summary modal, and transcript logging.

use crate::core::controller::ChatController;
use crate::core::message::Role;
use crate::logging::TranscriptLog;

pub struct ChatApp {
    pub controller: ChatController,
    /// Logged-in username; `None` in simple/demo mode.
    pub username: Option<String>,
    /// Most recent prior-session summary, shown as display-only context.
    pub context: Option<String>,
    /// Welcome/context banners show until the first send of the session.
    pub show_banners: bool,
    pub input: String,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    /// Summary of the just-concluded session, shown in a modal until
    /// dismissed.
    pub summary_modal: Option<String>,
    pub log: TranscriptLog,
    logged_through: usize,
}

impl ChatApp {
    pub fn new(
        username: Option<String>,
        context: Option<String>,
        log_file: Option<String>,
    ) -> Self {
        Self {
            controller: ChatController::new(),
            username,
            context,
            show_banners: true,
            input: String::new(),
            scroll_offset: 0,
            auto_scroll: true,
            summary_modal: None,
            log: TranscriptLog::new(log_file),
            logged_through: 0,
        }
    }

    pub fn hide_banners(&mut self) {
        self.show_banners = false;
    }

    /// Dismiss the summary modal and start a fresh session, restoring the
    /// banners the way a page reload did in the original client.
    pub fn dismiss_summary(&mut self) {
        if self.summary_modal.take().is_some() {
            self.controller.acknowledge_session_end();
            self.show_banners = true;
            self.auto_scroll = true;
        }
    }

    /// Write any transcript entries appended since the last call to the
    /// log file. Failures are logged, never surfaced.
    pub fn sync_log(&mut self) {
        let messages = self.controller.transcript().messages();
        for message in &messages[self.logged_through..] {
            let prefix = match message.role {
                Role::User => "You: ",
                Role::Counselor => "Counselor: ",
                Role::AppInfo | Role::AppError => "",
            };
            if let Err(err) = self.log.append(&format!("{prefix}{}", message.content)) {
                tracing::error!(error = %err, "failed to write transcript log");
            }
        }
        self.logged_through = messages.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controller::Phase;

    #[test]
    fn dismissing_the_summary_resets_the_view() {
        let mut app = ChatApp::new(Some("sam".to_string()), None, None);
        app.show_banners = false;
        app.controller.begin_end_session().expect("ending");
        app.controller
            .complete_end_session(Ok(Some("Summary.".to_string())));
        app.summary_modal = Some("Summary.".to_string());

        app.dismiss_summary();
        assert!(app.summary_modal.is_none());
        assert!(app.show_banners);
        assert_eq!(app.controller.phase(), Phase::Idle);
    }

    #[test]
    fn sync_log_tracks_new_entries_only() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("chat.log");
        let mut app = ChatApp::new(None, None, Some(path.to_string_lossy().into_owned()));

        let turn = app.controller.begin_send("hello").expect("turn");
        app.sync_log();
        app.controller
            .complete_send(&turn.content, Ok("hi".to_string()));
        app.sync_log();
        app.sync_log();

        let contents = std::fs::read_to_string(&path).expect("read");
        assert_eq!(contents.matches("You: hello").count(), 1);
        assert_eq!(contents.matches("Counselor: hi").count(), 1);
    }
}
