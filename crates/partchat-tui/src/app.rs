use std::sync::Arc;

use partchat_core::{ChatBackend, ChatReply, ClientError, Conversation, PendingTurn, Provider};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub conversation: Conversation,

    // Backend
    pub backend: Arc<dyn ChatBackend>,
    pub api_base: String,
    events: UnboundedSender<AppEvent>,

    // Chat view scrolling; follow_bottom pins the view to the newest message
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_total_lines: u16,
    pub follow_bottom: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Provider picker state
    pub show_provider_picker: bool,
    pub provider_picker_state: ListState,

    // Chat area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        api_base: String,
        provider: Provider,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            conversation: Conversation::new(provider),

            backend,
            api_base,
            events,

            chat_scroll: 0,
            chat_height: 0,
            chat_total_lines: 0,
            follow_bottom: true,

            animation_frame: 0,

            show_provider_picker: false,
            provider_picker_state: ListState::default(),

            chat_area: None,
        }
    }

    /// Submit the input field. No-op while sending or when the input is blank.
    pub fn submit(&mut self) {
        if let Some(turn) = self.conversation.submit_input() {
            self.follow_bottom = true;
            self.animation_frame = 0;
            self.spawn_request(turn);
        }
    }

    /// Run the request in the background and report the outcome as
    /// [`AppEvent::Settled`]. A report to a closed loop is dropped.
    fn spawn_request(&self, turn: PendingTurn) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();

        tokio::spawn(async move {
            let request = tokio::spawn(async move {
                backend.send(&turn.message, turn.provider).await
            });
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(err) => Err(ClientError::Task(err.to_string())),
            };
            if events.send(AppEvent::Settled(outcome)).is_err() {
                tracing::debug!("chat view closed before the request settled");
            }
        });
    }

    pub fn settle(&mut self, outcome: Result<ChatReply, ClientError>) {
        if self.conversation.settle(outcome) {
            self.follow_bottom = true;
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn max_scroll(&self) -> u16 {
        self.chat_total_lines.saturating_sub(self.chat_height)
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
        if self.chat_scroll >= self.max_scroll() {
            self.follow_bottom = true;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.chat_height / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.chat_height / 2).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
        self.follow_bottom = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
        self.follow_bottom = true;
    }

    /// Record the rendered chat size; keeps the view pinned when following.
    pub fn update_chat_metrics(&mut self, total_lines: u16, height: u16) {
        self.chat_total_lines = total_lines;
        self.chat_height = height;
        if self.follow_bottom {
            self.chat_scroll = self.max_scroll();
        } else {
            self.chat_scroll = self.chat_scroll.min(self.max_scroll());
        }
    }

    // Provider picker methods
    pub fn open_provider_picker(&mut self) {
        let current = Provider::all()
            .iter()
            .position(|p| *p == self.conversation.provider());
        self.provider_picker_state.select(current.or(Some(0)));
        self.show_provider_picker = true;
    }

    pub fn provider_picker_nav_down(&mut self) {
        let len = Provider::all().len();
        if len > 0 {
            let i = self.provider_picker_state.selected().unwrap_or(0);
            self.provider_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn provider_picker_nav_up(&mut self) {
        let i = self.provider_picker_state.selected().unwrap_or(0);
        self.provider_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_provider(&mut self) {
        if let Some(provider) = self
            .provider_picker_state
            .selected()
            .and_then(|i| Provider::all().get(i).copied())
        {
            self.set_provider(provider);
        }
        self.show_provider_picker = false;
    }

    pub fn cycle_provider(&mut self) {
        let next = self.conversation.provider().next();
        self.set_provider(next);
    }

    fn set_provider(&mut self, provider: Provider) {
        if provider != self.conversation.provider() {
            tracing::info!(%provider, "provider changed");
        }
        self.conversation.set_provider(provider);
    }
}
