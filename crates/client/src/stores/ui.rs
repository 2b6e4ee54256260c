//! UI store for sidebar, modal, theme and page-loading state. Not persisted.

use std::rc::Rc;

use futures_channel::mpsc::UnboundedReceiver;
use serde::{Deserialize, Serialize};

use super::observable::Observable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub is_sidebar_open: bool,
    pub active_modal: Option<String>,
    pub theme: Theme,
    pub is_page_loading: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            is_sidebar_open: true,
            active_modal: None,
            theme: Theme::System,
            is_page_loading: false,
        }
    }
}

#[derive(Clone)]
pub struct UiStore {
    state: Rc<Observable<UiState>>,
}

impl UiStore {
    pub fn new() -> Self {
        Self {
            state: Rc::new(Observable::new(UiState::default())),
        }
    }

    pub fn snapshot(&self) -> UiState {
        self.state.get()
    }

    pub fn subscribe(&self) -> UnboundedReceiver<UiState> {
        self.state.subscribe()
    }

    pub fn toggle_sidebar(&self) {
        self.state.update(|s| s.is_sidebar_open = !s.is_sidebar_open);
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.state.update(|s| s.is_sidebar_open = open);
    }

    pub fn open_modal(&self, modal_id: impl Into<String>) {
        let modal_id = modal_id.into();
        self.state.update(|s| s.active_modal = Some(modal_id));
    }

    pub fn close_modal(&self) {
        self.state.update(|s| s.active_modal = None);
    }

    pub fn set_theme(&self, theme: Theme) {
        self.state.update(|s| s.theme = theme);
    }

    pub fn set_page_loading(&self, loading: bool) {
        self.state.update(|s| s.is_page_loading = loading);
    }
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new()
    }
}
