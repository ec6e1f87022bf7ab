use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::warn;

/// One user intent from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    StartRecording,
    FinishRecording,
    StartStreaming,
    StopStreaming,
    ClearResult,
    ResetSession,
    ShowPanels,
    Quit,
}

/// Map a key press to its action.
///
/// Space starts a recording and Esc finishes it; the rest are mnemonic
/// letters. Whether an action applies in the current state is the owning
/// controller's call, not the keyboard's.
pub fn action_for(key: KeyEvent) -> Option<InputAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputAction::Quit);
    }
    match key.code {
        KeyCode::Char(' ') => Some(InputAction::StartRecording),
        KeyCode::Esc => Some(InputAction::FinishRecording),
        KeyCode::Char('s') => Some(InputAction::StartStreaming),
        KeyCode::Char('x') => Some(InputAction::StopStreaming),
        KeyCode::Char('c') => Some(InputAction::ClearResult),
        KeyCode::Char('r') => Some(InputAction::ResetSession),
        KeyCode::Char('p') => Some(InputAction::ShowPanels),
        KeyCode::Char('q') => Some(InputAction::Quit),
        _ => None,
    }
}

/// Read keys on a dedicated thread and forward actions to the async loop.
///
/// The terminal is in raw mode, so Space and Esc arrive unbuffered and never
/// reach the shell. The thread exits when the receiver goes away or after
/// forwarding Quit.
pub fn spawn_input_thread() -> mpsc::Receiver<InputAction> {
    let (tx, rx) = mpsc::channel(16);

    thread::spawn(move || loop {
        match event::poll(Duration::from_millis(200)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = action_for(key) {
                        if tx.blocking_send(action).is_err() {
                            return;
                        }
                        if action == InputAction::Quit {
                            return;
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("Key read failed: {}", err);
                    return;
                }
            },
            Ok(false) => {
                if tx.is_closed() {
                    return;
                }
            }
            Err(err) => {
                warn!("Key poll failed: {}", err);
                return;
            }
        }
    });

    rx
}
