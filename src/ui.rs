//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Drawing only reads the feed view;
//! it never triggers requests.
//!
//! Layout, top to bottom: search bar, feed list, compose panel (while
//! composing or attaching), one-line status bar.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Field, Mode};
use crate::gateway::Post;
use crate::sync::PendingUpload;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let composing = matches!(app.mode, Mode::Compose(_) | Mode::Attach);
    let [search_area, feed_area, compose_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(if composing { 5 } else { 0 }),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_search_bar(app, frame, search_area);
    draw_feed(app, frame, feed_area);
    if composing {
        draw_compose(app, frame, compose_area);
    }
    draw_status_bar(app, frame, status_area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_search_bar(app: &App, frame: &mut Frame, area: Rect) {
    let query = app.session.view().query();
    let text = if query.is_empty() && app.mode != Mode::Search {
        Span::styled("press / to search", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(query)
    };
    let search = Paragraph::new(Line::from(text)).block(
        Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(focus_style(app.mode == Mode::Search)),
    );
    frame.render_widget(search, area);
}

/// Render the scrollable post list.
fn draw_feed(app: &mut App, frame: &mut Frame, area: Rect) {
    let view = app.session.view();
    let title = if view.is_loading() {
        " Feed (loading…) "
    } else {
        " Feed "
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if view.posts().is_empty() {
        let placeholder = if view.is_loading() { "Loading…" } else { "No posts yet." };
        let empty = Paragraph::new(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let pending_delete = match app.mode {
        Mode::ConfirmDelete(id) => Some(id),
        _ => None,
    };

    let list_items: Vec<ListItem> = view
        .posts()
        .iter()
        .map(|post| {
            let mut header = vec![
                Span::styled(
                    post.author.clone(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    posted_at(post),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw("  "),
                Span::styled(format!("♥ {}", post.likes), Style::default().fg(Color::Red)),
            ];
            if let Some(image) = &post.image {
                header.push(Span::raw("  "));
                header.push(Span::styled(
                    format!("[img {image}]"),
                    Style::default().fg(Color::Magenta),
                ));
            }
            if pending_delete == Some(post.id) {
                header.push(Span::styled(
                    "  delete? y/N",
                    Style::default().fg(Color::Black).bg(Color::Red),
                ));
            }

            ListItem::new(vec![
                Line::from(header),
                Line::from(Span::styled(post.body.clone(), Style::default().fg(Color::White))),
            ])
        })
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the compose / attach panel.
fn draw_compose(app: &App, frame: &mut Frame, area: Rect) {
    let (title, lines) = match app.mode {
        Mode::Attach => (
            " Attach image (Enter: upload, Esc: cancel) ",
            vec![Line::from(vec![
                Span::styled("path: ", Style::default().fg(Color::DarkGray)),
                Span::raw(app.attach_path.as_str()),
            ])],
        ),
        _ => {
            let field_line = |label: &'static str, value: &str, focused: bool| {
                Line::from(vec![
                    Span::styled(label, focus_style(focused)),
                    Span::raw(value.to_string()),
                ])
            };
            (
                " New post (Tab: switch, Enter: send, Esc: close) ",
                vec![
                    field_line("name:    ", &app.author, app.mode == Mode::Compose(Field::Author)),
                    field_line("message: ", &app.body, app.mode == Mode::Compose(Field::Body)),
                    Line::from(Span::styled(
                        attachment_label(app.session.view().pending_upload()),
                        Style::default().fg(Color::Magenta),
                    )),
                ],
            )
        }
    };

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(focus_style(true)),
        );
    frame.render_widget(panel, area);
}

fn posted_at(post: &Post) -> String {
    match post.created_at {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => "unknown time".into(),
    }
}

fn attachment_label(pending: &PendingUpload) -> String {
    match pending {
        PendingUpload::Empty => "no image".into(),
        PendingUpload::Uploading { file_name, .. } => format!("uploading {file_name}…"),
        PendingUpload::Ready { path } => format!("image: {path}"),
    }
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let view = app.session.view();
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(app.status.as_str(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} posts", view.posts().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            attachment_label(view.pending_upload()),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            if app.session.has_deferred_post() { " (post waiting)" } else { "" },
            Style::default().fg(Color::Magenta),
        ),
        Span::raw("  q: quit  /: search  n: post  a: attach  x: drop image  l: like  d: delete"),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
