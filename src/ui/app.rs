use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use quotacard_core::{
    build, DragController, DragOutcome, FileBackend, MemoryBackend, ParseFailure, PointerEvent,
    PositionStore, QuotaSnapshot, RenderPlan,
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

use crate::config::Settings;
use crate::monitor::{PollMessage, SnapshotPoller};

use super::components::{CardContext, CardLayout, QuotaCard};
use super::key_handler::{self, KeyAction};
use super::layout;

/// Main application
pub struct App {
    settings: Settings,
    layout: CardLayout,
    store: PositionStore,
    /// `None` when the card is pinned
    drag: Option<DragController>,
    snapshot: Result<QuotaSnapshot, ParseFailure>,
    collected_at: Option<DateTime<Utc>>,
    plan: RenderPlan,
    /// Where the card was last drawn
    card: Rect,
    running: bool,
}

impl App {
    /// Create a new application
    pub fn new(settings: Settings) -> Result<Self> {
        let store = open_store(&settings)?;
        let layout = CardLayout::from(&settings.ui);
        let drag = layout
            .draggable
            .then(|| DragController::new(store.clone()));

        Ok(Self {
            settings,
            layout,
            store,
            drag,
            snapshot: Err(ParseFailure::Empty),
            collected_at: None,
            plan: RenderPlan::Loading,
            card: Rect::default(),
            running: true,
        })
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(
            stdout,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::event::EnableMouseCapture,
            crossterm::event::EnableFocusChange
        )?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Start poller
        let poller = SnapshotPoller::new(&self.settings);
        let refresh = poller.refresh_handle();
        let mut poll_rx = poller.start();

        // Main loop
        let result = self.main_loop(&mut terminal, &mut poll_rx, &refresh).await;

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture,
            crossterm::event::DisableFocusChange
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        poll_rx: &mut mpsc::Receiver<PollMessage>,
        refresh: &Arc<Notify>,
    ) -> Result<()> {
        while self.running {
            self.frame_plan(Utc::now());

            let ctx = CardContext {
                layout: self.layout,
                data_path: &self.settings.data_path,
                collected_at: self.collected_at,
                dragging: self.is_dragging(),
            };
            let position = self.store.current();
            let plan = &self.plan;
            let mut card = self.card;
            terminal.draw(|frame| {
                card = QuotaCard::render(frame, frame.area(), plan, position, &ctx);
            })?;
            self.card = card;

            // Handle events with timeout
            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(&key, refresh)
                    }
                    Event::Mouse(mouse) => self.handle_mouse(&mouse),
                    Event::FocusLost => self.handle_pointer(PointerEvent::Cancel),
                    _ => {}
                }
            }

            // Process poll messages
            while let Ok(msg) = poll_rx.try_recv() {
                match msg {
                    PollMessage::Snapshot(result) => self.apply_snapshot(result),
                }
            }
        }

        Ok(())
    }

    /// Rebuild the plan for a frame at `now`. The plan is frozen while
    /// dragging so a refresh cannot change the card under the pointer.
    fn frame_plan(&mut self, now: DateTime<Utc>) {
        if !self.is_dragging() {
            self.plan = build(&self.snapshot, now, &self.settings.thresholds);
        }
    }

    fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(|d| d.is_dragging())
    }

    fn handle_key(&mut self, key: &KeyEvent, refresh: &Notify) {
        match key_handler::resolve_key(key) {
            KeyAction::Quit => self.running = false,
            KeyAction::Refresh => refresh.notify_one(),
            KeyAction::None => {}
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        if let Some(pointer) = key_handler::pointer_event(mouse, self.is_dragging()) {
            self.handle_pointer(pointer);
        }
    }

    fn handle_pointer(&mut self, pointer: PointerEvent) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if let DragOutcome::Released(position) = drag.handle(pointer, layout::bounds(self.card)) {
            tracing::debug!("Card moved to top={} left={}", position.top, position.left);
        }
    }

    /// Replace the current snapshot with a fresh read
    fn apply_snapshot(&mut self, result: Result<QuotaSnapshot, ParseFailure>) {
        self.collected_at = match &result {
            Ok(snapshot) => Some(snapshot.timestamp.unwrap_or_else(Utc::now)),
            Err(_) => None,
        };
        self.snapshot = result;
    }
}

/// Position store for the configured persistence mode
fn open_store(settings: &Settings) -> Result<PositionStore> {
    if !settings.position.persist {
        return Ok(PositionStore::open(MemoryBackend::new()));
    }
    let backend = FileBackend::new(&settings.position.dir, &settings.position.key)
        .context("Invalid [position] settings")?;
    tracing::debug!("Card position stored at {:?}", backend.path());
    Ok(PositionStore::open(backend))
}
