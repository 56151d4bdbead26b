use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::connection::edges_to_items;
use crate::profile::{Organization, Profile, User};
use crate::types::{FromNode, Person};

use super::{list, not_found};

const SIDEBAR_WIDTH: u16 = 34;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(profile) = &app.profile else {
        let message = if app.loading {
            Span::styled("Loading profile...", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("Could not load this profile", Style::default().fg(Color::Red))
        };
        frame.render_widget(
            Paragraph::new(Line::from(message)).block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    match profile {
        Profile::User(user) => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                .split(area);
            render_user(frame, user, chunks[0]);
            render_navigator(frame, app, chunks[1]);
        }
        Profile::Organization(org) => {
            let lines = organization_lines(org);
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(lines.len() as u16 + 2),
                    Constraint::Min(0),
                ])
                .split(area);
            frame.render_widget(
                Paragraph::new(lines)
                    .block(Block::default().borders(Borders::ALL))
                    .wrap(Wrap { trim: true }),
                chunks[0],
            );
            render_navigator(frame, app, chunks[1]);
        }
        Profile::NotFound => not_found::render(frame, area),
    }
}

fn render_user(frame: &mut Frame, user: &User, area: Rect) {
    let mut lines = Vec::new();
    if let Some(name) = user.name.as_deref().filter(|n| !n.is_empty()) {
        lines.push(Line::from(Span::styled(
            name.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        user.login.clone(),
        Style::default().fg(Color::Gray),
    )));

    if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
        lines.push(Line::default());
        lines.push(Line::from(bio.to_string()));
    }

    lines.push(Line::default());
    for (label, value) in [
        ("Company", &user.company),
        ("Location", &user.location),
        ("Email", &user.email),
        ("Website", &user.website_url),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            lines.push(field(label, value));
        }
    }

    if let Some(organizations) = user.organizations.as_ref().filter(|c| !c.is_empty()) {
        let organizations: Vec<Person> = edges_to_items(Some(organizations))
            .into_iter()
            .map(Person::from_node)
            .collect();
        if !organizations.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Organizations",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
            for org in organizations {
                lines.push(Line::from(format!("  {}", org.login)));
            }
        }
    }

    let sidebar = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(sidebar, area);
}

fn organization_lines(org: &Organization) -> Vec<Line<'static>> {
    let title = org.name.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| org.login.clone());
    let mut lines = vec![Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(org.login.clone(), Style::default().fg(Color::Gray)),
    ])];

    if let Some(description) = org.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(Line::from(description.to_string()));
    }

    let details: Vec<Line> = [
        ("Location", &org.location),
        ("Website", &org.website_url),
        ("Email", &org.email),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| field(label, v))
    })
    .collect();
    lines.extend(details);
    lines
}

fn field(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::raw(value.to_string()),
    ])
}

fn render_navigator(frame: &mut Frame, app: &App, area: Rect) {
    let Some(nav) = &app.navigator else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let labels = nav.labels();
    let titles: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("[{}] {}", i + 1, label))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(nav.tab_index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    let title = labels.get(nav.tab_index()).copied().unwrap_or_default();
    let paginator = nav.paginator();
    if paginator.state().is_loading {
        list::render_skeleton(frame, chunks[1], title, nav.item_kind());
    } else {
        list::render(
            frame,
            chunks[1],
            title,
            nav.entries(),
            app.list_index,
            list::Footer::of(paginator),
        );
    }
}
