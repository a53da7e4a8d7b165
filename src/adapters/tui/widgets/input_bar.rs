use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Single-line text entry for new task titles.
pub struct InputBar {
    value: String,
    // Cursor position in chars, not bytes
    cursor_position: usize,
    is_focused: bool,
}

impl InputBar {
    pub fn new() -> Self {
        Self {
            value: String::new(),
            cursor_position: 0,
            is_focused: false,
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_index = self.byte_index();
        self.value.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        self.cursor_position -= 1;
        let byte_index = self.byte_index();
        self.value.remove(byte_index);
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// `busy` swaps the title for the in-progress label and dims the box.
    pub fn render(&self, frame: &mut Frame, area: Rect, busy: bool) {
        let title = if busy { "Adding..." } else { "Add Task" };

        let border_style = if busy {
            Style::default().fg(Color::DarkGray)
        } else if self.is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let text = if self.value.is_empty() {
            if self.is_focused {
                "Enter new task"
            } else {
                "Press a to add a task"
            }
        } else {
            &self.value
        };

        let text_style = if self.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let paragraph = Paragraph::new(text).block(block).style(text_style);
        frame.render_widget(paragraph, area);

        if self.is_focused {
            let offset = u16::try_from(self.cursor_position).unwrap_or(u16::MAX);
            let cursor_x = area.x.saturating_add(1).saturating_add(offset);
            let cursor_y = area.y.saturating_add(1);

            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(ratatui::layout::Position {
                    x: cursor_x,
                    y: cursor_y,
                });
            }
        }
    }
}
