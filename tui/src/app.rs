//! Terminal app state: the list controller plus focus and selection.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tasklist_core::{Key, ListController, TaskId, TaskStore};

/// Which pane receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    List,
}

pub struct App<S> {
    pub controller: ListController<S>,
    pub focus: Focus,
    pub selected: usize,
    pub should_quit: bool,
}

impl<S: TaskStore> App<S> {
    pub fn new(controller: ListController<S>) -> Self {
        Self {
            controller,
            focus: Focus::Input,
            selected: 0,
            should_quit: false,
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.controller.tasks().get(self.selected).map(|t| t.id.clone())
    }

    /// Keep the cursor on a row after the list was replaced.
    fn clamp_selection(&mut self) {
        let len = self.controller.tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.controller.tasks().len() {
            self.selected += 1;
        }
    }

    fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Dialogs are modal.
        if self.controller.notice().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.controller.dismiss_notice();
            }
            return;
        }
        if self.controller.pending_removal().is_some() {
            self.handle_confirm_key(key).await;
            return;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key).await,
            Focus::List => self.handle_list_key(key).await,
        }
        self.clamp_selection();
    }

    async fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.controller.resolve_removal(true).await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.controller.resolve_removal(false).await;
            }
            _ => {}
        }
        self.clamp_selection();
    }

    async fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.controller.on_key(Key::Enter).await;
                if self.controller.input().is_empty() {
                    // The new task is the newest, so it sits on top.
                    self.selected = 0;
                }
            }
            KeyCode::Backspace => self.controller.on_key(Key::Backspace).await,
            KeyCode::Tab | KeyCode::Down | KeyCode::Esc => self.focus = Focus::List,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.controller.on_key(Key::Char(c)).await;
            }
            _ => {}
        }
    }

    async fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.selected_id() {
                    self.controller.toggle_task(&id).await;
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.controller.request_removal(&id);
                }
            }
            KeyCode::Char('r') => self.controller.refresh().await,
            KeyCode::Tab | KeyCode::Char('i') | KeyCode::Esc => self.focus = Focus::Input,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }
}
