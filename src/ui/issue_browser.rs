use chrono::Utc;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use super::{format_age, truncate};
use crate::app::App;
use crate::screens::{IssueBrowserScreen, LoadState};
use crate::types::IssueState;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(browser) = app.issue_browser.as_ref() {
        render_browser(frame, browser, area);
    }
}

fn render_browser(frame: &mut Frame, browser: &IssueBrowserScreen, area: Rect) {
    // Issues that loaded are shown even when the repository details did not
    if browser.repository.is_none() && browser.status != LoadState::Ready {
        render_placeholder(frame, browser, area);
        return;
    }

    let owner_height = if browser.repository.is_some() { 5 } else { 1 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(owner_height),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_owner(frame, browser, chunks[0]);
    render_filters(frame, browser, chunks[1]);
    render_issues(frame, browser, chunks[2]);
    render_pagination(frame, browser, chunks[3]);
}

/// Shown until the first load settles, or when it failed
fn render_placeholder(frame: &mut Frame, browser: &IssueBrowserScreen, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", browser.repository_name));

    let body = match &browser.status {
        LoadState::Failed(msg) => Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Failed to load: {}", msg),
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "r: retry | q: back to repositories",
                Style::default().fg(Color::Gray),
            )),
        ]),
        _ => Paragraph::new("Loading...").style(Style::default().fg(Color::Yellow)),
    };

    frame.render_widget(body.block(block).wrap(Wrap { trim: true }), area);
}

fn render_owner(frame: &mut Frame, browser: &IssueBrowserScreen, area: Rect) {
    let Some(repo) = browser.repository.as_ref() else {
        let line = Line::from(vec![
            Span::styled(
                browser.repository_name.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  details unavailable (r: retry)",
                Style::default().fg(Color::Red),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                repo.name.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format!("@{}", repo.owner.login), Style::default().fg(Color::Gray)),
            Span::raw("  "),
            Span::styled(
                format!("★ {}", repo.stargazers_count),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} open", repo.open_issues_count),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(Span::raw(repo.description.clone().unwrap_or_default())),
        Line::from(vec![
            Span::styled(repo.html_url.clone(), Style::default().fg(Color::Blue)),
            Span::raw("  "),
            Span::styled(
                repo.owner.avatar_url.clone(),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];

    let owner = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Repository "))
        .wrap(Wrap { trim: true });

    frame.render_widget(owner, area);
}

fn render_filters(frame: &mut Frame, browser: &IssueBrowserScreen, area: Rect) {
    let options = browser.filters.options();
    let titles: Vec<String> = options
        .iter()
        .map(|o| format!("[{}] {}", o.label.chars().next().unwrap_or(' '), o.label))
        .collect();
    let selected = options.iter().position(|o| o.active).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Filters "))
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_issues(frame: &mut Frame, browser: &IssueBrowserScreen, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        " {} issues ({}) ",
        browser.active_filter(),
        browser.issues.len()
    ));

    if let LoadState::Failed(msg) = &browser.status {
        let failed = Paragraph::new(format!("Failed to load issues: {} (r: retry)", msg))
            .block(block)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(failed, area);
        return;
    }

    if browser.issues.is_empty() && !browser.is_loading() {
        let empty = Paragraph::new("No issues on this page")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 58; // #num(7) + state(6) + labels(20) + @author(16) + age(4) + comments(6) + spaces
    let flex = w.saturating_sub(fixed).max(10);
    let now = Utc::now();

    let items: Vec<ListItem> = browser
        .issues
        .iter()
        .enumerate()
        .map(|(i, issue)| {
            let style = if i == browser.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let (state, state_color) = match (issue.is_pull_request(), issue.state) {
                (true, _) => ("PR".to_string(), Color::Magenta),
                (false, IssueState::Open) => (issue.state.to_string(), Color::Green),
                (false, IssueState::Closed) => (issue.state.to_string(), Color::Red),
            };

            let labels = if issue.labels.is_empty() {
                String::new()
            } else {
                let joined: Vec<&str> = issue.labels.iter().map(|l| l.name.as_str()).collect();
                format!("[{}]", truncate(&joined.join(", "), 18))
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("#{:<6}", issue.number),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(format!("{:6}", state), Style::default().fg(state_color)),
                Span::raw(" "),
                Span::styled(format!("{:<flex$}", truncate(&issue.title, flex)), style),
                Span::raw(" "),
                Span::styled(format!("{:<20}", labels), Style::default().fg(Color::Magenta)),
                Span::raw(" "),
                Span::styled(
                    format!("@{:<15}", truncate(&issue.user.login, 15)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("{:>4}", format_age(issue.created_at, now)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!(" 💬{}", issue.comments),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !browser.issues.is_empty() {
        state.select(Some(browser.selected));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_pagination(frame: &mut Frame, browser: &IssueBrowserScreen, area: Rect) {
    // Prev is dimmed on page 1; change_page clamps the request itself
    let prev_style = if browser.has_prev_page() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    };

    let line = Line::from(vec![
        Span::styled("◀ prev", prev_style),
        Span::raw("  |  "),
        Span::styled(
            format!("page {}", browser.page),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled("next ▶", Style::default().fg(Color::Cyan)),
    ]);

    frame.render_widget(
        Paragraph::new(line).alignment(ratatui::layout::Alignment::Center),
        area,
    );
}
