//! The interactive chat event loop.
//!
//! The loop owns the app state behind `Arc<Mutex<_>>`; network calls run
//! in spawned tasks and report back over an unbounded channel, so the UI
//! stays responsive while a request is outstanding. Re-entrant sends are
//! suppressed by the controller's `Sending` phase, but scrolling and the
//! summary modal keep working.

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, io, sync::Arc, time::Duration};
use tokio::sync::{mpsc, Mutex};

use crate::api::client::CounselingBackend;
use crate::api::ApiError;
use crate::commands::{process_input, CommandResult};
use crate::core::app::ChatApp;
use crate::core::controller::{EndOutcome, OutboundTurn, SendOutcome};
use crate::core::profile::ProfileStore;
use crate::core::session::SessionId;
use crate::ui::renderer::{max_scroll_offset, ui};

/// Pause between a farewell reply and the summarization call, so the
/// user sees the counselor's goodbye before the modal appears.
const FAREWELL_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatExit {
    /// The user quit; the session stays open on the server.
    Quit,
    /// The user logged out; persisted identity was cleared.
    LoggedOut,
    /// The backend returned 401; persisted identity was cleared.
    SessionExpired,
}

enum NetEvent {
    Turn {
        sent: String,
        result: Result<String, ApiError>,
    },
    Ended {
        result: Result<Option<String>, ApiError>,
    },
}

enum EnterAction {
    None,
    Send(OutboundTurn),
    End(SessionId),
    Logout,
    Quit,
}

/// Run the chat view until the user quits, logs out, or the session
/// expires. `store` is `None` for unauthenticated sessions, where there
/// is no persisted identity to clear.
pub async fn run_chat(
    backend: Arc<dyn CounselingBackend>,
    store: Option<&ProfileStore>,
    app: ChatApp,
) -> Result<ChatExit, Box<dyn Error>> {
    let app = Arc::new(Mutex::new(app));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<NetEvent>();

    let exit = 'main: loop {
        {
            let mut app_guard = app.lock().await;
            terminal.draw(|f| ui(f, &mut app_guard))?;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break 'main ChatExit::Quit;
                    }
                    KeyCode::Enter => {
                        let action = handle_enter(&app).await;
                        match action {
                            EnterAction::Send(turn) => {
                                spawn_turn(backend.clone(), turn, tx.clone());
                            }
                            EnterAction::End(session_id) => {
                                spawn_end(backend.clone(), session_id, None, tx.clone());
                            }
                            EnterAction::Logout => {
                                let mut app_guard = app.lock().await;
                                app_guard.controller.logout();
                                app_guard.sync_log();
                                drop(app_guard);
                                clear_store(store);
                                break 'main ChatExit::LoggedOut;
                            }
                            EnterAction::Quit => break 'main ChatExit::Quit,
                            EnterAction::None => {}
                        }
                    }
                    KeyCode::Esc => {
                        let mut app_guard = app.lock().await;
                        app_guard.dismiss_summary();
                    }
                    KeyCode::Char(c) => {
                        let mut app_guard = app.lock().await;
                        if app_guard.summary_modal.is_none() {
                            app_guard.input.push(c);
                        }
                    }
                    KeyCode::Backspace => {
                        let mut app_guard = app.lock().await;
                        app_guard.input.pop();
                    }
                    KeyCode::Up => {
                        let mut app_guard = app.lock().await;
                        app_guard.auto_scroll = false;
                        app_guard.scroll_offset = app_guard.scroll_offset.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        let mut app_guard = app.lock().await;
                        let available_height = transcript_height(&terminal);
                        let max_scroll = max_scroll_offset(&app_guard, available_height);
                        app_guard.scroll_offset =
                            app_guard.scroll_offset.saturating_add(1).min(max_scroll);
                        if app_guard.scroll_offset >= max_scroll {
                            app_guard.auto_scroll = true;
                        }
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        let mut app_guard = app.lock().await;
                        app_guard.auto_scroll = false;
                        app_guard.scroll_offset = app_guard.scroll_offset.saturating_sub(3);
                    }
                    MouseEventKind::ScrollDown => {
                        let mut app_guard = app.lock().await;
                        let available_height = transcript_height(&terminal);
                        let max_scroll = max_scroll_offset(&app_guard, available_height);
                        app_guard.scroll_offset =
                            app_guard.scroll_offset.saturating_add(3).min(max_scroll);
                        if app_guard.scroll_offset >= max_scroll {
                            app_guard.auto_scroll = true;
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        while let Ok(net_event) = rx.try_recv() {
            let mut app_guard = app.lock().await;
            match net_event {
                NetEvent::Turn { sent, result } => {
                    let outcome = app_guard.controller.complete_send(&sent, result);
                    app_guard.sync_log();
                    match outcome {
                        SendOutcome::Replied | SendOutcome::Degraded => {}
                        SendOutcome::Farewell => {
                            if let Some(session_id) = app_guard.controller.begin_end_session() {
                                spawn_end(
                                    backend.clone(),
                                    session_id,
                                    Some(FAREWELL_DELAY),
                                    tx.clone(),
                                );
                            }
                        }
                        SendOutcome::Expired => {
                            drop(app_guard);
                            clear_store(store);
                            break 'main ChatExit::SessionExpired;
                        }
                    }
                }
                NetEvent::Ended { result } => {
                    match app_guard.controller.complete_end_session(result) {
                        EndOutcome::Summary(summary) => {
                            app_guard.summary_modal = Some(summary);
                        }
                        EndOutcome::Reset | EndOutcome::Unchanged => {}
                    }
                    app_guard.sync_log();
                }
            }
        }
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(exit)
}

/// Resolve an Enter press into the action to take after the lock is
/// released.
async fn handle_enter(app: &Arc<Mutex<ChatApp>>) -> EnterAction {
    let mut app_guard = app.lock().await;

    if app_guard.summary_modal.is_some() {
        app_guard.dismiss_summary();
        return EnterAction::None;
    }

    let text = app_guard.input.clone();
    if text.trim().is_empty() {
        return EnterAction::None;
    }

    // The draft is only consumed when the intent dispatches; a send
    // suppressed by an outstanding request leaves the input untouched.
    match process_input(&mut app_guard, &text) {
        CommandResult::Continue => {
            app_guard.input.clear();
            EnterAction::None
        }
        CommandResult::Quit => EnterAction::Quit,
        CommandResult::Logout => EnterAction::Logout,
        CommandResult::EndSession => match app_guard.controller.begin_end_session() {
            Some(session_id) => {
                app_guard.input.clear();
                EnterAction::End(session_id)
            }
            None => EnterAction::None,
        },
        CommandResult::ProcessAsMessage(message) => {
            match app_guard.controller.begin_send(&message) {
                Some(turn) => {
                    app_guard.input.clear();
                    app_guard.hide_banners();
                    app_guard.auto_scroll = true;
                    app_guard.sync_log();
                    EnterAction::Send(turn)
                }
                None => EnterAction::None,
            }
        }
    }
}

fn spawn_turn(
    backend: Arc<dyn CounselingBackend>,
    turn: OutboundTurn,
    tx: mpsc::UnboundedSender<NetEvent>,
) {
    tokio::spawn(async move {
        let result = backend
            .chat_turn(turn.session_id.as_str(), &turn.content)
            .await;
        let _ = tx.send(NetEvent::Turn {
            sent: turn.content,
            result,
        });
    });
}

fn spawn_end(
    backend: Arc<dyn CounselingBackend>,
    session_id: SessionId,
    delay: Option<Duration>,
    tx: mpsc::UnboundedSender<NetEvent>,
) {
    tokio::spawn(async move {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = backend.end_session(session_id.as_str()).await;
        let _ = tx.send(NetEvent::Ended { result });
    });
}

fn clear_store(store: Option<&ProfileStore>) {
    if let Some(store) = store {
        if let Err(err) = store.clear() {
            tracing::error!(error = %err, "failed to clear persisted login state");
        }
    }
}

fn transcript_height(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> u16 {
    let height = terminal.size().map(|size| size.height).unwrap_or_default();
    // Input area takes 3 rows, the transcript title takes 1.
    height.saturating_sub(3).saturating_sub(1)
}
