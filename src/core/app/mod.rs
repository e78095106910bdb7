//! Application state shared between the controller and the terminal UI.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::session::Session;
use crate::ui::theme::ThemeMode;

pub mod ui_state;

pub use ui_state::UiState;

pub struct App {
    pub session: Session,
    pub ui: UiState,
    /// Model name shown in the sidebar.
    pub model: String,
}

impl App {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            session: Session::new(),
            ui: UiState::new(ThemeMode::default()),
            model: model.into(),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.session.is_in_flight()
    }
}

/// Cloneable handle to the shared [`App`]. Closures passed to [`read`] and
/// [`update`] run under the lock and must not block.
///
/// [`read`]: AppHandle::read
/// [`update`]: AppHandle::update
#[derive(Clone)]
pub struct AppHandle {
    inner: Arc<Mutex<App>>,
}

impl AppHandle {
    pub fn new(app: Arc<Mutex<App>>) -> Self {
        Self { inner: app }
    }

    pub fn from_app(app: App) -> Self {
        Self::new(Arc::new(Mutex::new(app)))
    }

    pub async fn read<R>(&self, f: impl FnOnce(&App) -> R) -> R {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut App) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handle_clones_share_state() {
        let handle = AppHandle::from_app(App::new("test-model"));
        let other = handle.clone();

        other
            .update(|app| {
                app.session.begin_turn("hello");
            })
            .await;

        let (len, in_flight) = handle
            .read(|app| (app.session.len(), app.is_in_flight()))
            .await;
        assert_eq!(len, 1);
        assert!(in_flight);
    }
}
