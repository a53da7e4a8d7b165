use crate::domain::TodoId;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Completion of an operation dispatched in the background. Errors are
/// carried as display strings; the UI only shows and logs them.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Fetched(Result<usize, String>),
    Added(Result<TodoId, String>),
    Toggled(TodoId, Result<bool, String>),
    Deleted(TodoId, Result<(), String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,
    CloseModal,

    // List navigation (arrow keys work from any pane)
    NextTodo,
    PreviousTodo,

    // Input handling
    Character(char),
    Backspace,
    Enter,
    Tab,
    BackTab,

    Operation(OperationOutcome),

    Tick,
}

pub struct EventHandler {
    should_quit: bool,
    outcomes: UnboundedReceiver<OperationOutcome>,
}

impl EventHandler {
    pub fn new(outcomes: UnboundedReceiver<OperationOutcome>) -> Self {
        Self {
            should_quit: false,
            outcomes,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Finished operations are delivered before terminal input so the next
    /// frame reflects them.
    pub async fn next_event(&mut self) -> Result<AppEvent> {
        if let Ok(outcome) = self.outcomes.try_recv() {
            return Ok(AppEvent::Operation(outcome));
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key_event) => Ok(self.handle_key_event(key_event)),
                _ => Ok(AppEvent::Tick),
            }
        } else {
            Ok(AppEvent::Tick)
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> AppEvent {
        match key_event {
            // Global quit with Ctrl+C
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.should_quit = true;
                AppEvent::Quit
            }

            KeyEvent { code: KeyCode::Esc, .. } => AppEvent::CloseModal,

            KeyEvent { code: KeyCode::Tab, .. } => AppEvent::Tab,

            KeyEvent { code: KeyCode::BackTab, .. } => AppEvent::BackTab,

            KeyEvent { code: KeyCode::Enter, .. } => AppEvent::Enter,

            KeyEvent { code: KeyCode::Down, .. } => AppEvent::NextTodo,

            KeyEvent { code: KeyCode::Up, .. } => AppEvent::PreviousTodo,

            KeyEvent { code: KeyCode::Backspace, .. } => AppEvent::Backspace,

            // Letters are context-sensitive: typed into the input or used as
            // list commands, decided by the app
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE,
                ..
            } => AppEvent::Character(c),

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::SHIFT,
                ..
            } => AppEvent::Character(c.to_uppercase().next().unwrap_or(c)),

            _ => AppEvent::Tick,
        }
    }
}
