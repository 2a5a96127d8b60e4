use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Settled(outcome) => app.settle(outcome),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_provider_picker {
        handle_provider_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_provider_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.show_provider_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.provider_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.provider_picker_nav_up(),
        KeyCode::Enter => app.select_provider(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('p') => app.open_provider_picker(),
        KeyCode::Tab => app.cycle_provider(),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Enter => {
            app.submit();
            return;
        }
        KeyCode::Tab => {
            app.cycle_provider();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_half_page_down();
            return;
        }
        KeyCode::PageUp => {
            app.scroll_half_page_up();
            return;
        }
        _ => {}
    }

    // The input field is disabled while a request is in flight
    let Some(input) = app.conversation.input_mut() else {
        return;
    };

    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => input.clear(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use partchat_core::conversation::REQUEST_FAILED;
    use partchat_core::{ChatBackend, ChatReply, ClientError, Provider};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct Echo;

    #[async_trait]
    impl ChatBackend for Echo {
        async fn send(&self, message: &str, provider: Provider) -> Result<ChatReply, ClientError> {
            Ok(ChatReply::answer(format!("{} via {}", message, provider)))
        }
    }

    fn app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(
            Arc::new(Echo),
            "http://127.0.0.1:8000".to_string(),
            Provider::OpenAI,
            tx,
        );
        (app, rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_enter_sends_and_settles() {
        let (mut app, mut rx) = app();
        type_str(&mut app, "hello");
        press(&mut app, KeyCode::Enter);

        assert!(app.conversation.is_sending());
        assert!(app.conversation.input().is_empty());
        assert_eq!(app.conversation.messages().len(), 2);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, AppEvent::Settled(Ok(_))));
        handle_event(&mut app, event);

        assert!(!app.conversation.is_sending());
        let messages = app.conversation.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].content, "hello via openai");
    }

    #[tokio::test]
    async fn test_typing_and_enter_ignored_while_sending() {
        let (mut app, mut rx) = app();
        type_str(&mut app, "first");
        press(&mut app, KeyCode::Enter);

        type_str(&mut app, "second");
        press(&mut app, KeyCode::Enter);

        assert!(app.conversation.input().is_empty());
        assert_eq!(app.conversation.messages().len(), 2);

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event);
        assert_eq!(app.conversation.messages().len(), 3);
    }

    #[test]
    fn test_blank_enter_is_noop() {
        let (mut app, _rx) = app();
        type_str(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert!(!app.conversation.is_sending());
        assert_eq!(app.conversation.messages().len(), 1);
    }

    #[test]
    fn test_failed_settlement_returns_to_idle() {
        let (mut app, _rx) = app();
        app.conversation.begin_turn("hi");
        handle_event(
            &mut app,
            AppEvent::Settled(Err(ClientError::Task("cancelled".to_string()))),
        );

        assert!(!app.conversation.is_sending());
        assert_eq!(app.conversation.messages()[2].content, REQUEST_FAILED);
    }

    #[test]
    fn test_provider_picker_selects() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('p'));
        assert!(app.show_provider_picker);

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        assert!(!app.show_provider_picker);
        assert_eq!(app.conversation.provider(), Provider::DeepSeek);
    }

    #[test]
    fn test_tab_cycles_provider_while_editing() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.conversation.provider(), Provider::DeepSeek);
        assert!(app.conversation.input().is_empty());
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit, "q types into the input while editing");

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_scroll_unpins_and_repins() {
        let (mut app, _rx) = app();
        app.update_chat_metrics(40, 10);
        assert_eq!(app.chat_scroll, 30);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.chat_scroll, 29);
        assert!(!app.follow_bottom);

        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.chat_scroll, 30);
        assert!(app.follow_bottom);
    }

    #[test]
    fn test_resize_keeps_view_pinned() {
        let (mut app, _rx) = app();
        app.update_chat_metrics(40, 10);
        handle_event(&mut app, AppEvent::Resize);

        assert!(app.follow_bottom);
        app.update_chat_metrics(40, 20);
        assert_eq!(app.chat_scroll, 20);
    }
}
