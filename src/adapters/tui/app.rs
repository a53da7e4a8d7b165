use super::{
    event::{AppEvent, EventHandler, OperationOutcome},
    widgets::InputBar,
};
use crate::application::{TodoState, TodoStore};
use crate::domain::{Todo, TodoId, TodoTitle};
use color_eyre::Result;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};

#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Main,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusedPane {
    Input,
    TodoList,
}

pub struct App {
    store: Arc<TodoStore>,
    outcomes: UnboundedSender<OperationOutcome>,

    // UI State
    mode: AppMode,
    focused_pane: FocusedPane,

    // New task entry
    input: InputBar,
    validation_message: Option<String>,

    // Last snapshot read from the store
    state: TodoState,
    todo_list_state: TableState,

    // Only UI-owned piece of operation state: the row whose delete is in flight
    deleting_id: Option<TodoId>,

    // Most recent operation failure or hint
    status_message: Option<String>,
}

impl App {
    pub fn new(store: Arc<TodoStore>, outcomes: UnboundedSender<OperationOutcome>) -> Self {
        let mut app = Self {
            store,
            outcomes,
            mode: AppMode::Main,
            focused_pane: FocusedPane::TodoList,
            input: InputBar::new(),
            validation_message: None,
            state: TodoState::default(),
            todo_list_state: TableState::default(),
            deleting_id: None,
            status_message: None,
        };

        app.todo_list_state.select(Some(0));
        app
    }

    pub fn initialize(&mut self) {
        self.dispatch_fetch();
    }

    /// Pulls the latest state from the store before a frame is drawn.
    pub async fn sync_state(&mut self) {
        self.state = self.store.snapshot().await;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.state.todos.len();
        match self.todo_list_state.selected() {
            _ if len == 0 => self.todo_list_state.select(None),
            Some(selected) if selected >= len => self.todo_list_state.select(Some(len - 1)),
            None => self.todo_list_state.select(Some(0)),
            Some(_) => {}
        }
    }

    fn selected_todo(&self) -> Option<&Todo> {
        self.todo_list_state
            .selected()
            .and_then(|i| self.state.todos.get(i))
    }

    fn focus(&mut self, pane: FocusedPane) {
        self.focused_pane = pane;
        self.input.set_focused(pane == FocusedPane::Input);
    }

    fn dispatch_fetch(&self) {
        let store = self.store.clone();
        let outcomes = self.outcomes.clone();
        tracing::debug!("Dispatching fetch-all");
        tokio::spawn(async move {
            let result = store
                .fetch_all()
                .await
                .map(|todos| todos.len())
                .map_err(|e| e.to_string());
            let _ = outcomes.send(OperationOutcome::Fetched(result));
        });
    }

    fn submit_new_todo(&mut self) {
        if self.state.is_loading {
            return;
        }

        let title = match TodoTitle::parse(self.input.value()) {
            Ok(title) => title,
            Err(e) => {
                self.validation_message = Some(e.to_string());
                return;
            }
        };

        self.validation_message = None;
        self.input.clear();

        let store = self.store.clone();
        let outcomes = self.outcomes.clone();
        tracing::debug!("Dispatching add: {}", title);
        tokio::spawn(async move {
            let result = store
                .add(title.as_str())
                .await
                .map_err(|e| e.to_string());
            let _ = outcomes.send(OperationOutcome::Added(result));
        });
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_todo().map(|todo| todo.id.clone()) else {
            return;
        };

        let store = self.store.clone();
        let outcomes = self.outcomes.clone();
        tracing::debug!("Dispatching toggle: {}", id);
        tokio::spawn(async move {
            let result = store.toggle(&id).await.map_err(|e| e.to_string());
            let _ = outcomes.send(OperationOutcome::Toggled(id, result));
        });
    }

    fn delete_selected(&mut self) {
        let Some((id, can_delete)) = self
            .selected_todo()
            .map(|todo| (todo.id.clone(), todo.can_delete()))
        else {
            return;
        };

        if self.deleting_id.as_ref() == Some(&id) {
            return;
        }
        if !can_delete {
            self.status_message = Some("Complete a task before deleting it".to_string());
            return;
        }

        self.deleting_id = Some(id.clone());

        let store = self.store.clone();
        let outcomes = self.outcomes.clone();
        tracing::debug!("Dispatching delete: {}", id);
        tokio::spawn(async move {
            let result = store.delete(&id).await.map_err(|e| e.to_string());
            let _ = outcomes.send(OperationOutcome::Deleted(id, result));
        });
    }

    fn handle_outcome(&mut self, outcome: OperationOutcome) {
        match outcome {
            OperationOutcome::Fetched(Ok(count)) => {
                tracing::debug!("Fetch finished with {} todos", count);
                self.status_message = None;
            }
            OperationOutcome::Fetched(Err(e)) => {
                tracing::error!("Failed to load tasks: {}", e);
                self.status_message = Some(format!("Failed to load tasks: {e}"));
            }
            OperationOutcome::Added(Ok(id)) => {
                tracing::debug!("Add finished: {}", id);
            }
            OperationOutcome::Added(Err(e)) => {
                tracing::error!("Failed to add todo: {}", e);
                self.status_message = Some(format!("Failed to add task: {e}"));
            }
            OperationOutcome::Toggled(id, Ok(status)) => {
                tracing::debug!("Toggle finished: {} -> {}", id, status);
            }
            OperationOutcome::Toggled(id, Err(e)) => {
                tracing::error!("Failed to toggle todo {}: {}", id, e);
                self.status_message = Some(format!("Failed to toggle task: {e}"));
            }
            OperationOutcome::Deleted(id, result) => {
                if self.deleting_id.as_ref() == Some(&id) {
                    self.deleting_id = None;
                }
                if let Err(e) = result {
                    tracing::error!("Failed to delete todo {}: {}", id, e);
                    self.status_message = Some(format!("Failed to delete task: {e}"));
                }
            }
        }
    }

    pub async fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        if self.mode == AppMode::Help {
            match event {
                AppEvent::Quit => return Ok(true),
                AppEvent::Operation(outcome) => self.handle_outcome(outcome),
                AppEvent::Tick => {}
                // Any key closes help
                _ => self.mode = AppMode::Main,
            }
            return Ok(false);
        }

        match event {
            AppEvent::Quit => return Ok(true),

            AppEvent::Operation(outcome) => self.handle_outcome(outcome),

            AppEvent::Tab | AppEvent::BackTab => match self.focused_pane {
                FocusedPane::Input => self.focus(FocusedPane::TodoList),
                FocusedPane::TodoList => self.focus(FocusedPane::Input),
            },

            AppEvent::CloseModal => {
                if self.focused_pane == FocusedPane::Input {
                    // Esc from input: discard the draft and go back to the list
                    self.input.clear();
                    self.focus(FocusedPane::TodoList);
                }
            }

            AppEvent::Enter => {
                if self.focused_pane == FocusedPane::Input {
                    self.submit_new_todo();
                } else {
                    self.toggle_selected();
                }
            }

            AppEvent::Backspace => {
                if self.focused_pane == FocusedPane::Input {
                    self.input.delete_char();
                }
            }

            AppEvent::NextTodo => self.next_todo(),
            AppEvent::PreviousTodo => self.previous_todo(),

            AppEvent::Character(c) if self.focused_pane == FocusedPane::Input => {
                self.input.insert_char(c);
            }

            AppEvent::Character(c) => match c {
                'q' => return Ok(true),
                'j' => self.next_todo(),
                'k' => self.previous_todo(),
                'g' => {
                    if !self.state.todos.is_empty() {
                        self.todo_list_state.select(Some(0));
                    }
                }
                'G' => {
                    if !self.state.todos.is_empty() {
                        self.todo_list_state
                            .select(Some(self.state.todos.len() - 1));
                    }
                }
                ' ' => self.toggle_selected(),
                'd' => self.delete_selected(),
                'r' => self.dispatch_fetch(),
                'a' | 'i' => self.focus(FocusedPane::Input),
                '?' => self.mode = AppMode::Help,
                _ => {}
            },

            AppEvent::Tick => {}
        }

        Ok(false)
    }

    fn next_todo(&mut self) {
        if self.state.todos.is_empty() {
            return;
        }

        let current = self.todo_list_state.selected().unwrap_or(0);
        let next = if current >= self.state.todos.len() - 1 {
            0
        } else {
            current + 1
        };
        self.todo_list_state.select(Some(next));
    }

    fn previous_todo(&mut self) {
        if self.state.todos.is_empty() {
            return;
        }

        let current = self.todo_list_state.selected().unwrap_or(0);
        let previous = if current == 0 {
            self.state.todos.len() - 1
        } else {
            current - 1
        };
        self.todo_list_state.select(Some(previous));
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(3), // Input
                Constraint::Length(1), // Validation message
                Constraint::Min(0),    // Todo list
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        let title = Paragraph::new("TODO List").style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(title, chunks[0]);

        self.input.render(frame, chunks[1], self.state.is_loading);

        if let Some(message) = &self.validation_message {
            let paragraph = Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red));
            frame.render_widget(paragraph, chunks[2]);
        }

        self.render_todo_list(frame, chunks[3]);
        self.render_status_bar(frame, chunks[4]);

        if self.mode == AppMode::Help {
            self.render_help(frame);
        }
    }

    fn render_todo_list(&mut self, frame: &mut Frame, area: Rect) {
        let len = self.state.todos.len();
        let done = self.state.completed_count();
        let title = if self.state.error {
            format!("Tasks ({done}/{len} done) - sync failed")
        } else {
            format!("Tasks ({done}/{len} done)")
        };
        let border_style = if self.focused_pane == FocusedPane::TodoList {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        if self.state.is_loading {
            let paragraph = Paragraph::new("Loading tasks...")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, area);
            return;
        }

        if self.state.todos.is_empty() {
            let (message, color) = if self.state.error {
                ("Failed to load tasks. Press r to retry.", Color::Red)
            } else {
                ("No tasks available. Please add a new task.", Color::Gray)
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .style(Style::default().fg(color));
            frame.render_widget(paragraph, area);
            return;
        }

        let rows: Vec<Row> = self
            .state
            .todos
            .iter()
            .map(|todo| {
                let title_style = if todo.status {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default()
                };

                let deleting = self.deleting_id.as_ref() == Some(&todo.id);
                let action = if deleting {
                    Cell::from("Deleting...").style(Style::default().fg(Color::Yellow))
                } else if todo.can_delete() {
                    Cell::from("Delete").style(Style::default().fg(Color::Red))
                } else {
                    Cell::from("Delete").style(Style::default().fg(Color::DarkGray))
                };

                Row::new(vec![
                    Cell::from(Line::from(vec![
                        Span::raw(todo.checkbox()),
                        Span::raw(" "),
                        Span::styled(todo.title.as_str(), title_style),
                    ])),
                    action,
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(20),    // Title column (flexible)
                Constraint::Length(12), // Delete control
            ],
        )
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

        frame.render_stateful_widget(table, area, &mut self.todo_list_state);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.focused_pane {
            FocusedPane::Input => "Enter: add | Esc: cancel | Tab: tasks",
            FocusedPane::TodoList => {
                "j/k: navigate | Space: toggle | d: delete | a: add | r: refresh | ?: help | q: quit"
            }
        };

        let mut spans = Vec::new();
        if let Some(message) = &self.status_message {
            spans.push(Span::styled(message.as_str(), Style::default().fg(Color::Red)));
            spans.push(Span::raw(" | "));
        }
        if let Some(synced) = self.state.last_synced {
            let synced = synced.with_timezone(&chrono::Local).format("%H:%M:%S");
            spans.push(Span::styled(
                format!("Synced {synced}"),
                Style::default().fg(Color::DarkGray),
            ));
            spans.push(Span::raw(" | "));
        }
        spans.push(Span::styled(hints, Style::default().fg(Color::DarkGray)));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 70, frame.area());

        frame.render_widget(ratatui::widgets::Clear, popup_area);

        let help_text = [
            "TODO List Help",
            "",
            "Tasks:",
            "  j/k or ↑/↓     - Move up/down",
            "  g/G            - Go to first/last task",
            "  Space or Enter - Toggle completion",
            "  d              - Delete (completed tasks only)",
            "  r              - Reload from the server",
            "",
            "Adding:",
            "  a, i or Tab    - Focus the new task input",
            "  Enter          - Add the task",
            "  Esc            - Discard input and return to the list",
            "",
            "General:",
            "  ?              - Show this help",
            "  q              - Quit",
            "  Ctrl+C         - Force quit application",
            "",
            "Press any key to close this help",
        ]
        .join("\n");

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().title("Help").borders(Borders::ALL))
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

pub async fn run_tui(store: Arc<TodoStore>) -> Result<()> {
    // color-eyre is already initialized in main.rs
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let mut app = App::new(store, outcome_tx);
    let mut event_handler = EventHandler::new(outcome_rx);

    // Set up terminal
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.initialize();

    let result = run_loop(&mut terminal, &mut app, &mut event_handler).await;

    // Cleanup runs even when the loop failed
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        app.sync_state().await;
        terminal.draw(|frame| app.render(frame))?;

        let event = event_handler.next_event().await?;
        if app.handle_event(event).await? || event_handler.should_quit() {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockTodoRepository, RepositoryError};
    use ratatui::backend::TestBackend;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn app_with(repo: MockTodoRepository) -> (App, UnboundedReceiver<OperationOutcome>) {
        let store = Arc::new(TodoStore::new(Arc::new(repo)));
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(store, tx), rx)
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(AppEvent::Character(c)).await.unwrap();
        }
    }

    /// Runs the initial fetch and folds its outcome in.
    async fn loaded(app: &mut App, rx: &mut UnboundedReceiver<OperationOutcome>) {
        app.initialize();
        let outcome = rx.recv().await.unwrap();
        app.handle_event(AppEvent::Operation(outcome)).await.unwrap();
        app.sync_state().await;
    }

    #[tokio::test]
    async fn test_empty_list_message() {
        let mut repo = MockTodoRepository::new();
        repo.expect_list_todos().times(1).returning(|| Ok(Vec::new()));
        let (mut app, mut rx) = app_with(repo);

        loaded(&mut app, &mut rx).await;

        let screen = screen(&mut app);
        assert!(screen.contains("No tasks available. Please add a new task."));
        assert!(screen.contains("Add Task"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_shown() {
        let mut repo = MockTodoRepository::new();
        repo.expect_list_todos()
            .times(1)
            .returning(|| Err(RepositoryError::Network("offline".to_string())));
        let (mut app, mut rx) = app_with(repo);

        loaded(&mut app, &mut rx).await;

        assert!(app.state.error);
        let screen = screen(&mut app);
        assert!(screen.contains("Failed to load tasks. Press r to retry."));
    }

    #[tokio::test]
    async fn test_empty_submission_rejected_locally() {
        let mut repo = MockTodoRepository::new();
        repo.expect_create_todo().never();
        repo.expect_list_todos().never();
        let (mut app, mut rx) = app_with(repo);

        app.handle_event(AppEvent::Character('a')).await.unwrap();
        type_text(&mut app, "   ").await;
        app.handle_event(AppEvent::Enter).await.unwrap();

        assert_eq!(
            app.validation_message.as_deref(),
            Some("The task cannot be empty!")
        );
        assert!(rx.try_recv().is_err());
        assert!(screen(&mut app).contains("The task cannot be empty!"));
    }

    #[tokio::test]
    async fn test_add_clears_input_and_message() {
        let mut repo = MockTodoRepository::new();
        repo.expect_create_todo()
            .withf(|title| title.as_str() == "buy milk")
            .times(1)
            .returning(|_| Ok(TodoId::from("-Nxyz")));
        repo.expect_list_todos()
            .times(1)
            .returning(|| Ok(vec![Todo::new("-Nxyz", "buy milk", false)]));
        let (mut app, mut rx) = app_with(repo);

        app.handle_event(AppEvent::Tab).await.unwrap();
        app.handle_event(AppEvent::Enter).await.unwrap();
        assert!(app.validation_message.is_some());

        type_text(&mut app, "buy milk").await;
        app.handle_event(AppEvent::Enter).await.unwrap();
        assert!(app.validation_message.is_none());
        assert_eq!(app.input.value(), "");

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome, OperationOutcome::Added(Ok(TodoId::from("-Nxyz"))));
        app.handle_event(AppEvent::Operation(outcome)).await.unwrap();
        app.sync_state().await;

        assert_eq!(app.state.todos, vec![Todo::new("-Nxyz", "buy milk", false)]);
        assert!(screen(&mut app).contains("[ ] buy milk"));
    }

    #[tokio::test]
    async fn test_submit_ignored_while_loading() {
        let mut repo = MockTodoRepository::new();
        repo.expect_create_todo().never();
        repo.expect_list_todos().never();
        let (mut app, mut rx) = app_with(repo);

        app.handle_event(AppEvent::Tab).await.unwrap();
        type_text(&mut app, "x").await;
        app.state.is_loading = true;
        app.handle_event(AppEvent::Enter).await.unwrap();

        assert_eq!(app.input.value(), "x");
        assert!(app.validation_message.is_none());
        assert!(rx.try_recv().is_err());

        let screen = screen(&mut app);
        assert!(screen.contains("Adding..."));
        assert!(screen.contains("Loading tasks..."));
    }

    #[tokio::test]
    async fn test_refresh_key_fetches() {
        let mut repo = MockTodoRepository::new();
        repo.expect_list_todos()
            .times(1)
            .returning(|| Ok(vec![Todo::new("a1", "x", false)]));
        let (mut app, mut rx) = app_with(repo);

        app.handle_event(AppEvent::Character('r')).await.unwrap();

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome, OperationOutcome::Fetched(Ok(1)));
        app.handle_event(AppEvent::Operation(outcome)).await.unwrap();
        app.sync_state().await;
        assert!(screen(&mut app).contains("[ ] x"));
    }

    #[tokio::test]
    async fn test_list_keys_type_into_focused_input() {
        let repo = MockTodoRepository::new();
        let (mut app, _rx) = app_with(repo);

        app.handle_event(AppEvent::Character('i')).await.unwrap();
        let quit = app.handle_event(AppEvent::Character('q')).await.unwrap();
        type_text(&mut app, "d r").await;

        assert!(!quit);
        assert_eq!(app.input.value(), "qd r");

        app.handle_event(AppEvent::CloseModal).await.unwrap();
        assert_eq!(app.input.value(), "");
        assert_eq!(app.focused_pane, FocusedPane::TodoList);
        assert!(app.handle_event(AppEvent::Character('q')).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_requires_completed_todo() {
        let mut repo = MockTodoRepository::new();
        repo.expect_list_todos()
            .returning(|| Ok(vec![Todo::new("a1", "open", false)]));
        repo.expect_delete_todo().never();
        let (mut app, mut rx) = app_with(repo);
        loaded(&mut app, &mut rx).await;

        app.handle_event(AppEvent::Character('d')).await.unwrap();

        assert!(app.deleting_id.is_none());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Complete a task before deleting it")
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_tracks_in_flight_row() {
        let mut repo = MockTodoRepository::new();
        repo.expect_list_todos().returning(|| {
            Ok(vec![
                Todo::new("a1", "done", true),
                Todo::new("b2", "open", false),
            ])
        });
        repo.expect_delete_todo().times(1).returning(|_| Ok(()));
        let (mut app, mut rx) = app_with(repo);
        loaded(&mut app, &mut rx).await;

        app.handle_event(AppEvent::Character('d')).await.unwrap();
        assert_eq!(app.deleting_id, Some(TodoId::from("a1")));
        assert!(screen(&mut app).contains("Deleting..."));

        // A second press while in flight dispatches nothing
        app.handle_event(AppEvent::Character('d')).await.unwrap();

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome, OperationOutcome::Deleted(TodoId::from("a1"), Ok(())));
        app.handle_event(AppEvent::Operation(outcome)).await.unwrap();
        app.sync_state().await;

        assert!(app.deleting_id.is_none());
        assert_eq!(app.state.todos, vec![Todo::new("b2", "open", false)]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_delete_resets_in_flight_row() {
        let mut repo = MockTodoRepository::new();
        repo.expect_list_todos()
            .returning(|| Ok(vec![Todo::new("a1", "done", true)]));
        repo.expect_delete_todo()
            .times(1)
            .returning(|_| Err(RepositoryError::Api("HTTP 500: boom".to_string())));
        let (mut app, mut rx) = app_with(repo);
        loaded(&mut app, &mut rx).await;

        app.handle_event(AppEvent::Character('d')).await.unwrap();
        let outcome = rx.recv().await.unwrap();
        app.handle_event(AppEvent::Operation(outcome)).await.unwrap();
        app.sync_state().await;

        assert!(app.deleting_id.is_none());
        assert_eq!(app.state.todos.len(), 1);
        assert!(app
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Failed to delete task")));
    }

    #[tokio::test]
    async fn test_toggle_selected_todo() {
        let mut repo = MockTodoRepository::new();
        repo.expect_list_todos()
            .returning(|| Ok(vec![Todo::new("a1", "x", false), Todo::new("b2", "y", false)]));
        repo.expect_get_todo()
            .returning(|id| Ok(Some(Todo::new(id.clone(), "y", false))));
        repo.expect_update_status()
            .withf(|id, status| id == &TodoId::from("b2") && *status)
            .times(1)
            .returning(|_, _| Ok(()));
        let (mut app, mut rx) = app_with(repo);
        loaded(&mut app, &mut rx).await;

        app.handle_event(AppEvent::NextTodo).await.unwrap();
        app.handle_event(AppEvent::Character(' ')).await.unwrap();

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome, OperationOutcome::Toggled(TodoId::from("b2"), Ok(true)));
        app.handle_event(AppEvent::Operation(outcome)).await.unwrap();
        app.sync_state().await;

        assert!(!app.state.todos[0].status);
        assert!(app.state.todos[1].status);
        assert!(screen(&mut app).contains("[x] y"));
    }

    #[tokio::test]
    async fn test_help_closes_on_any_key() {
        let repo = MockTodoRepository::new();
        let (mut app, _rx) = app_with(repo);

        app.handle_event(AppEvent::Character('?')).await.unwrap();
        assert_eq!(app.mode, AppMode::Help);
        assert!(screen(&mut app).contains("TODO List Help"));

        app.handle_event(AppEvent::Character('x')).await.unwrap();
        assert_eq!(app.mode, AppMode::Main);
    }
}
