use std::str::FromStr;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::paginated::Paginator;
use crate::types::{Entry, ItemKind, Person, Repository};

/// Placeholder items drawn while the first page loads.
const SKELETON_ITEMS: u16 = 3;

/// What the line under a list offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footer {
    LoadMore,
    FetchingMore,
    Exhausted,
}

impl Footer {
    pub fn of(paginator: &Paginator) -> Self {
        if paginator.is_fetching_more() {
            Footer::FetchingMore
        } else if paginator.has_next_page() {
            Footer::LoadMore
        } else {
            Footer::Exhausted
        }
    }
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    entries: &[Entry],
    selected: usize,
    footer: Footer,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ({})", title, entries.len()));

    if entries.is_empty() {
        let empty = Paragraph::new("There is no item to show")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let width = chunks[0].width as usize;
    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if i == selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            match entry {
                Entry::Repository(repo) => repository_item(repo, style, width),
                Entry::Person(person) => person_item(person, style, width),
            }
        })
        .collect();

    let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = ListState::default();
    state.select(Some(selected.min(entries.len() - 1)));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let footer = match footer {
        Footer::LoadMore => Span::styled("[m] Load more", Style::default().fg(Color::Cyan)),
        Footer::FetchingMore => Span::styled("Loading...", Style::default().fg(Color::Yellow)),
        Footer::Exhausted => {
            Span::styled("nothing more to show", Style::default().fg(Color::DarkGray))
        }
    };
    frame.render_widget(
        Paragraph::new(Line::from(footer)).alignment(Alignment::Center),
        chunks[1],
    );
}

fn repository_item(repo: &Repository, style: Style, width: usize) -> ListItem<'static> {
    let mut lines = vec![Line::from(Span::styled(truncate(&repo.name, width), style))];

    if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(Line::from(Span::styled(
            truncate(description, width),
            Style::default().fg(Color::Gray),
        )));
    }

    let mut details = Vec::new();
    if let Some(language) = &repo.primary_language {
        let color = language
            .color
            .as_deref()
            .and_then(|c| Color::from_str(c).ok())
            .unwrap_or(Color::Gray);
        details.push(Span::styled("● ", Style::default().fg(color)));
        details.push(Span::raw(language.name.clone()));
        details.push(Span::raw("   "));
    }
    details.push(Span::styled(
        format!("⑂ {}", repo.fork_count),
        Style::default().fg(Color::DarkGray),
    ));
    if let Some(license) = &repo.license_info {
        details.push(Span::raw("   "));
        details.push(Span::styled(
            license.name.clone(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.push(Line::from(details));

    ListItem::new(lines)
}

fn person_item(person: &Person, style: Style, width: usize) -> ListItem<'static> {
    let mut heading = Vec::new();
    if let Some(name) = person.name.as_deref().filter(|n| !n.is_empty()) {
        heading.push(Span::styled(truncate(name, width / 2), style));
        heading.push(Span::raw("  "));
        heading.push(Span::styled(
            person.login.clone(),
            Style::default().fg(Color::Gray),
        ));
    } else {
        heading.push(Span::styled(person.login.clone(), style));
    }
    let mut lines = vec![Line::from(heading)];

    if let Some(bio) = person.bio.as_deref().filter(|b| !b.is_empty()) {
        lines.push(Line::from(Span::styled(
            truncate(bio, width),
            Style::default().fg(Color::Gray),
        )));
    }

    let whereabouts: Vec<&str> = [person.company.as_deref(), person.location.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    if !whereabouts.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate(&whereabouts.join(" · "), width),
            Style::default().fg(Color::DarkGray),
        )));
    }

    ListItem::new(lines)
}

/// Fixed-height placeholder for a list whose first page is loading. The
/// height only depends on `kind`, so the layout does not jump when items
/// arrive.
pub fn render_skeleton(frame: &mut Frame, area: Rect, title: &str, kind: ItemKind) {
    let rows: &[u16] = match kind {
        ItemKind::Repository => &[18, 32, 12],
        ItemKind::Person => &[14, 26],
    };
    let height = (rows.len() as u16 + 1) * SKELETON_ITEMS + 2;
    let area = Rect {
        height: height.min(area.height),
        ..area
    };

    let mut lines = Vec::new();
    for _ in 0..SKELETON_ITEMS {
        for &len in rows {
            let len = len.min(area.width.saturating_sub(2)) as usize;
            lines.push(Line::from(Span::styled(
                "░".repeat(len),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::default());
    }

    let skeleton = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(skeleton, area);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
