use partchat_core::{ChatRole, Provider};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use unicode_width::UnicodeWidthChar;

use crate::app::{App, InputMode};
use crate::markup_lines;

const INPUT_PLACEHOLDER: &str = "Type a message...";
const SENDING_PLACEHOLDER: &str = "Sending...";

/// Visible slice of the input and the cursor column inside it, measured in
/// terminal cells so wide characters keep the cursor aligned.
fn input_viewport(text: &str, cursor: usize, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }

    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let cell = |c: &char| c.width().unwrap_or(0);

    // Scroll right until the cursor cell fits
    let mut offset = 0;
    while offset < cursor && chars[offset..cursor].iter().map(cell).sum::<usize>() + 1 > width {
        offset += 1;
    }

    let mut used = 0;
    let visible: String = chars[offset..]
        .iter()
        .take_while(|c| {
            used += cell(*c);
            used <= width
        })
        .collect();
    let cursor_x: usize = chars[offset..cursor].iter().map(cell).sum();

    (visible, cursor_x as u16)
}

fn role_label(role: ChatRole) -> Line<'static> {
    let (label, color) = match role {
        ChatRole::User => ("You:", Color::Cyan),
        ChatRole::Assistant => ("Assistant:", Color::Yellow),
    };
    Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// All lines of the chat pane, including the pending-reply indicator.
fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in app.conversation.messages() {
        if msg.content.is_empty() {
            continue;
        }
        lines.push(role_label(msg.role));
        match msg.role {
            ChatRole::User => {
                lines.extend(markup_lines::to_lines(&msg.content).into_iter().map(|line| {
                    line.patch_style(Style::default().fg(Color::Cyan))
                }));
            }
            ChatRole::Assistant => lines.extend(markup_lines::to_lines(&msg.content)),
        }
        lines.push(Line::default());
    }

    if app.conversation.is_sending() {
        lines.push(role_label(ChatRole::Assistant));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.show_provider_picker {
        render_provider_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" PartSelect Assistant ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("[{}] ", app.conversation.provider().display_name()),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("API: {} ", app.api_base), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(" Chat ");

    let inner = block.inner(area);
    let paragraph = Paragraph::new(Text::from(chat_lines(app))).wrap(Wrap { trim: false });

    // Measured on the unbordered paragraph so the count matches what renders inside the block
    let total_lines = paragraph.line_count(inner.width).min(u16::MAX as usize) as u16;
    app.update_chat_metrics(total_lines, inner.height);

    let chat = paragraph.block(block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let sending = app.conversation.is_sending();
    let editing = app.input_mode == InputMode::Editing && !sending;

    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let send_label = if sending { " ... " } else { " Send ⏎ " };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ")
        .title(Line::from(send_label).right_aligned());

    let input = app.conversation.input();

    // Visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = input_viewport(input.text(), input.cursor(), inner_width);

    let paragraph = if sending {
        Paragraph::new(SENDING_PLACEHOLDER).style(Style::default().fg(Color::DarkGray).italic())
    } else if input.is_empty() {
        Paragraph::new(INPUT_PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(paragraph.block(block), area);

    if editing && !app.show_provider_picker {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::Gray);

    let hints: &[(&str, &str)] = if app.show_provider_picker {
        &[("j/k", "move"), ("Enter", "select"), ("Esc", "cancel")]
    } else {
        match app.input_mode {
            InputMode::Normal => &[
                ("i", "type"),
                ("j/k", "scroll"),
                ("g/G", "top/bottom"),
                ("p", "provider"),
                ("q", "quit"),
            ],
            InputMode::Editing => &[
                ("Enter", "send"),
                ("Tab", "provider"),
                ("Esc", "normal"),
                ("^C", "quit"),
            ],
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {}  ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_provider_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let providers = Provider::all();

    // Calculate popup size and position (centered)
    let popup_width = 32.min(area.width.saturating_sub(4));
    let popup_height = (providers.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Select Model ");

    let current = app.conversation.provider();
    let items: Vec<ListItem> = providers
        .iter()
        .map(|provider| {
            let is_current = *provider == current;
            let prefix = if is_current { "* " } else { "  " };
            let style = if is_current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{}{}", prefix, provider.display_name())).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.provider_picker_state);
}
