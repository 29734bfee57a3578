//! Rendering. Everything shown is derived from `App` on every frame.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use tasklist_core::{Task, TaskStore};

use crate::app::{App, Focus};

const TITLE: &str = "My Task List";
const SUBTITLE: &str = "Write down what to do today and keep track of it.";
const PLACEHOLDER: &str = "Type a task and press Enter";

pub fn render<S: TaskStore>(frame: &mut Frame, app: &App<S>) {
    let [header_area, input_area, list_area, footer_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header_area, app);
    render_input(frame, input_area, app);
    if app.controller.tasks().is_empty() {
        render_empty(frame, list_area);
    } else {
        render_list(frame, list_area, app);
    }
    render_footer(frame, footer_area, app);

    if let Some(notice) = app.controller.notice() {
        render_notice(frame, notice.message());
    } else if let Some(task) = app.controller.pending_removal() {
        render_confirm(frame, task);
    }
}

fn render_header<S: TaskStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let tally = app.controller.tally();
    let lines = vec![
        Line::from(Span::styled(
            TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::Gray))),
        Line::from(vec![
            Span::styled(
                format!(" ○ Pending {} ", tally.pending),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                format!(" ✔ Done {} ", tally.done),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    let header = Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_input<S: TaskStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let focused = app.focus == Focus::Input;
    let border = if focused { Color::Blue } else { Color::DarkGray };
    let input = app.controller.input();
    let content = if input.is_empty() {
        Line::from(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(input)
    };
    // Scroll so the end of the text and the cursor cell after it stay inside
    // the borders.
    let text_width = clamp_u16(Span::raw(input).width());
    let visible = area.width.saturating_sub(2);
    let offset = text_width.saturating_sub(visible.saturating_sub(1));

    let block = Block::default()
        .title(" New task ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    frame.render_widget(
        Paragraph::new(content).block(block).scroll((0, offset)),
        area,
    );

    if focused && app.controller.notice().is_none() && app.controller.pending_removal().is_none()
    {
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(text_width - offset);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn task_item(task: &Task) -> ListItem<'_> {
    let (mark, style) = if task.completed {
        (
            "[x]",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        ("[ ]", Style::default().add_modifier(Modifier::BOLD))
    };
    ListItem::new(Line::from(vec![
        Span::raw(format!("{mark} ")),
        Span::styled(task.text.as_str(), style),
    ]))
}

fn render_list<S: TaskStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let items: Vec<ListItem> = app.controller.tasks().iter().map(task_item).collect();
    let focused = app.focus == Focus::List;
    let block = Block::default().title(" Tasks ").borders(Borders::ALL).border_style(
        Style::default().fg(if focused { Color::Blue } else { Color::DarkGray }),
    );
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Tasks ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [_, text_area, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(inner);
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            "No tasks yet.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Add your first task!",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(text, text_area);
}

fn render_footer<S: TaskStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let hint = match app.focus {
        Focus::Input => "Enter add · Tab list · Ctrl-C quit",
        Focus::List => "↑/↓ move · Space toggle · d delete · r reload · Tab type · q quit",
    };
    let footer = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Centered dialog area, clipped to the frame.
fn center_dialog(frame_area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(frame_area.width);
    let height = height.min(frame_area.height);
    let x = frame_area.x + frame_area.width.saturating_sub(width) / 2;
    let y = frame_area.y + frame_area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn render_dialog(frame: &mut Frame, title: &str, border: Color, lines: Vec<Line<'_>>, hint: &str) {
    let widest = lines
        .iter()
        .map(|l| l.width())
        .chain([hint.chars().count(), title.chars().count()])
        .max()
        .unwrap_or(0);
    let width = clamp_u16(widest).saturating_add(6);
    let height = clamp_u16(lines.len()).saturating_add(4);
    let area = center_dialog(frame.area(), width.max(30), height);

    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [content_area, hint_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        content_area,
    );
    frame.render_widget(
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        hint_area,
    );
}

fn render_confirm(frame: &mut Frame, task: &Task) {
    let lines = vec![
        Line::from("Really delete this task?"),
        Line::from(""),
        Line::from(Span::styled(
            task.text.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    render_dialog(frame, " Delete ", Color::Red, lines, "Y/Enter confirm  N/Esc cancel");
}

fn render_notice(frame: &mut Frame, message: &str) {
    render_dialog(
        frame,
        " Error ",
        Color::Yellow,
        vec![Line::from(message)],
        "Enter/Esc dismiss",
    );
}
