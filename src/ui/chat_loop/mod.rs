//! Terminal event loop for the chat screen.
//!
//! A reader task forwards crossterm events over a channel. The loop turns
//! them into controller calls and repaints when input arrived or the
//! controller reported a [`SessionEvent`].

pub mod keybindings;
pub mod lifecycle;

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::app::{App, AppHandle};
use crate::core::config::Config;
use crate::core::controller::{ChatController, SessionEvent, SubmitOutcome};
use crate::core::provider::GeminiProvider;
use crate::core::session::ReplyStep;
use crate::ui::renderer::{sync_viewport, ui};
use crate::utils::clipboard::SystemClipboard;

use keybindings::{resolve_key, KeyAction};
use lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

const MAX_FPS: u64 = 30;
const WHEEL_LINES: u16 = 3;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Apply one key press.
pub async fn handle_key(controller: &ChatController, key: KeyEvent) -> LoopControl {
    let app = controller.app();
    match resolve_key(&key) {
        KeyAction::Quit => return LoopControl::Exit,
        KeyAction::Submit => {
            let prompt = app.read(|app| app.ui.input_text()).await;
            match controller.spawn_submit(prompt).await {
                // The turn runs on its own task and reports through events.
                Ok(_turn) => {}
                Err(SubmitOutcome::Busy) => debug!("submit ignored: reply still in flight"),
                Err(_) => {}
            }
        }
        KeyAction::InsertNewline => app.update(|app| app.ui.insert_newline()).await,
        KeyAction::NewChat => controller.new_chat().await,
        KeyAction::ToggleTheme => {
            controller.toggle_theme().await;
        }
        KeyAction::CopySelectedReply => {
            let controller = controller.clone();
            tokio::spawn(async move { controller.copy_selected_reply().await });
        }
        KeyAction::SelectOlderReply => {
            controller.select_reply(ReplyStep::Older).await;
        }
        KeyAction::SelectNewerReply => {
            controller.select_reply(ReplyStep::Newer).await;
        }
        KeyAction::ClearSelection => controller.clear_reply_selection().await,
        KeyAction::ScrollUp => app.update(|app| app.ui.scroll_up(1)).await,
        KeyAction::ScrollDown => app.update(|app| app.ui.scroll_down(1)).await,
        KeyAction::PageUp => app.update(|app| app.ui.page_up()).await,
        KeyAction::PageDown => app.update(|app| app.ui.page_down()).await,
        KeyAction::Edit => {
            app.update(|app| {
                app.ui.apply_input(key);
            })
            .await
        }
    }
    LoopControl::Continue
}

/// Apply one terminal event. Returns whether the screen needs a repaint and
/// whether the loop should stop.
pub async fn handle_event(controller: &ChatController, event: Event) -> (bool, LoopControl) {
    let app = controller.app();
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            (true, handle_key(controller, key).await)
        }
        Event::Paste(text) => {
            app.update(|app| app.ui.insert_str(&text)).await;
            (true, LoopControl::Continue)
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => {
                app.update(|app| app.ui.scroll_up(WHEEL_LINES)).await;
                (true, LoopControl::Continue)
            }
            MouseEventKind::ScrollDown => {
                app.update(|app| app.ui.scroll_down(WHEEL_LINES)).await;
                (true, LoopControl::Continue)
            }
            _ => (false, LoopControl::Continue),
        },
        Event::Resize(_, _) => (true, LoopControl::Continue),
        _ => (false, LoopControl::Continue),
    }
}

async fn draw_frame(app: &AppHandle, terminal: &mut ChatTerminal) -> Result<(), Box<dyn Error>> {
    let size = terminal.size()?;
    let area = ratatui::layout::Rect::new(0, 0, size.width, size.height);
    app.update(|app| {
        sync_viewport(app, area);
        terminal.draw(|f| ui(f, app)).map(|_| ())
    })
    .await?;
    Ok(())
}

pub async fn run_chat(config: Config) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::builder().build()?;
    let provider = GeminiProvider::new(
        client,
        config.base_url.clone(),
        config.api_key.clone(),
        config.model.clone(),
    );
    let app = AppHandle::from_app(App::new(config.model.clone()));
    let (controller, mut session_rx) = ChatController::new(
        app.clone(),
        Arc::new(provider),
        Arc::new(SystemClipboard),
        config.reveal,
    );

    info!(model = %config.model, base_url = %config.base_url, "starting chat");

    let (mut terminal, keyboard_enhanced) = setup_terminal()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut request_redraw = true;
    let mut last_draw = Instant::now() - frame_duration;

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        let in_flight = app.read(|app| app.is_in_flight()).await;
        // Keep the typing indicator moving.
        if in_flight && last_draw.elapsed() >= frame_duration {
            request_redraw = true;
        }

        if request_redraw {
            if let Err(err) = draw_frame(&app, &mut terminal).await {
                break 'main_loop Err(err);
            }
            request_redraw = false;
            last_draw = Instant::now();
        }

        let mut events_processed = false;
        while let Ok(UiEvent::Crossterm(ev)) = event_rx.try_recv() {
            events_processed = true;
            let (redraw, control) = handle_event(&controller, ev).await;
            request_redraw |= redraw;
            if control == LoopControl::Exit {
                break 'main_loop Ok(());
            }
        }

        while let Ok(event) = session_rx.try_recv() {
            if let SessionEvent::TurnFinished { turn_id, outcome } = &event {
                debug!(turn = turn_id, ?outcome, "turn finished");
            }
            request_redraw = true;
        }

        if !events_processed && !request_redraw {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    event_reader_handle.abort();
    controller.shutdown().await;
    restore_terminal(&mut terminal, keyboard_enhanced)?;
    info!("chat closed");

    result
}
