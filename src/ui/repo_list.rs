use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::truncate;
use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_add_form(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
}

fn render_add_form(frame: &mut Frame, app: &App, area: Rect) {
    let screen = &app.repo_list;

    // Lookup failures and duplicates share one indicator
    let (border, title) = if screen.not_found {
        (Color::Red, " Add repository - not found ")
    } else {
        (Color::Gray, " Add repository ")
    };

    let marker = if screen.loading {
        Span::styled(" ⟳", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(" +", Style::default().fg(Color::Green))
    };

    let text = if screen.input.is_empty() {
        Span::styled("owner/name", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(screen.input.as_str())
    };

    let form = Paragraph::new(Line::from(vec![text, Span::styled("▏", Style::default()), marker]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );

    frame.render_widget(form, area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let screen = &app.repo_list;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Repositories ({}) ", screen.repositories.len()));

    if screen.repositories.is_empty() {
        let empty = Paragraph::new("No repositories tracked yet")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 12; // space(1) + "Details →"(9) + spaces(2)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = screen
        .repositories
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let style = if i == screen.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(format!("{:<flex$}", truncate(&repo.name, flex)), style),
                Span::raw(" "),
                Span::styled("Details →", Style::default().fg(Color::Cyan)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(screen.selected));

    frame.render_stateful_widget(list, area, &mut state);
}
