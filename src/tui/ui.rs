use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::models::FAMILY_MEMBERS;
use crate::state::DataSource;
use crate::store::RemoteStore;
use crate::tui::app::{App, InputMode, PendingDelete, PromptKind, Screen};
use crate::tui::theme;
use crate::views::{overview, remaining_items, shopping_progress};

const BAR_WIDTH: usize = 10;

pub fn draw<S: RemoteStore>(frame: &mut Frame, app: &App<S>) {
    // Fill the entire background
    let bg_block = Block::default().style(Style::default().bg(theme::BG));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    match app.screen {
        Screen::UserSelect => draw_user_select(frame, app, chunks[1]),
        Screen::Home => draw_home(frame, app, chunks[1]),
        Screen::Projects => draw_projects(frame, app, chunks[1]),
        Screen::ProjectDetail => draw_project_detail(frame, app, chunks[1]),
        Screen::ShoppingLists => draw_shopping_lists(frame, app, chunks[1]),
        Screen::ShoppingDetail => draw_shopping_detail(frame, app, chunks[1]),
    }

    draw_footer(frame, app, chunks[2]);

    match &app.mode {
        InputMode::Normal => {}
        InputMode::Prompt(prompt) => {
            let mut lines = vec![Line::from(vec![
                Span::styled(prompt.input.clone(), Style::default().fg(theme::TEXT_BRIGHT)),
                Span::styled("▏", Style::default().fg(theme::MOSS)),
            ])];
            if prompt.kind == PromptKind::AddShoppingItem {
                lines.push(Line::from(vec![
                    Span::styled("Category: ", Style::default().fg(theme::TEXT_DIM)),
                    Span::styled(prompt.category.as_str(), Style::default().fg(theme::SEA)),
                    Span::styled("  (Tab)", Style::default().fg(theme::TEXT_DIM)),
                ]));
            }
            draw_overlay(frame, prompt.kind.label(), lines);
        }
        InputMode::Confirm(pending) => {
            let name = match pending {
                PendingDelete::Project(id) => app.state.project(id).map(|p| p.title.clone()),
                PendingDelete::ShoppingList(id) => {
                    app.state.shopping_list(id).map(|l| l.name.clone())
                }
            }
            .unwrap_or_default();
            let lines = vec![Line::from(vec![
                Span::styled(format!("Delete \"{name}\"? "), theme::error_style()),
                Span::styled("y/n", Style::default().fg(theme::TEXT_DIM)),
            ])];
            draw_overlay(frame, " Confirm ", lines);
        }
    }
}

fn panel<'a>(title: impl Into<String>, focused: bool) -> Block<'a> {
    let title_fg = if focused {
        theme::MOSS
    } else {
        theme::BORDER_DIM
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(focused))
        .title(Span::styled(
            title.into(),
            Style::default().fg(title_fg).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(theme::BG))
}

fn marker(selected: bool) -> Span<'static> {
    if selected {
        Span::styled(
            "▸ ",
            Style::default()
                .fg(theme::MOSS)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("  ", Style::default().fg(theme::TEXT_DIM))
    }
}

fn row_fg(selected: bool) -> Style {
    if selected {
        Style::default().fg(theme::TEXT_BRIGHT)
    } else {
        Style::default().fg(theme::TEXT_DIM)
    }
}

fn progress_spans(percent: u8) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            theme::progress_bar(percent, BAR_WIDTH),
            theme::progress_style(percent),
        ),
        Span::styled(format!(" {percent:>3}% "), theme::progress_style(percent)),
    ]
}

fn draw_header<S: RemoteStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let user = app
        .state
        .current_user()
        .map(|u| u.name.as_str())
        .unwrap_or("No user selected");
    let mut spans = vec![
        Span::styled(
            format!("  {} ", theme::HEADER_ART),
            Style::default()
                .fg(theme::MOSS)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(theme::BORDER_DIM)),
        Span::styled(user, Style::default().fg(theme::BIRCH)),
    ];
    if app.state.source() == DataSource::Cache {
        spans.push(Span::styled(" │ ", Style::default().fg(theme::BORDER_DIM)));
        spans.push(Span::styled("offline", theme::error_style()));
    }
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::panel_border(false))
            .style(Style::default().bg(theme::BG)),
    );
    frame.render_widget(header, area);
}

fn draw_user_select<S: RemoteStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let items: Vec<ListItem> = FAMILY_MEMBERS
        .iter()
        .copied()
        .chain(std::iter::once("Someone else…"))
        .enumerate()
        .map(|(i, name)| {
            let selected = i == app.user_idx;
            ListItem::new(Line::from(vec![
                marker(selected),
                Span::styled(name, row_fg(selected)),
            ]))
        })
        .collect();

    let area = centered(area, 40, (FAMILY_MEMBERS.len() as u16) + 3);
    frame.render_widget(List::new(items).block(panel(" Who are you? ", true)), area);
}

fn draw_home<S: RemoteStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let summary = overview(
        app.state.current_user(),
        app.state.projects(),
        app.state.shopping_lists(),
    );
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut project_lines: Vec<Line> = summary
        .recent_projects
        .iter()
        .map(|p| {
            let mut spans = progress_spans(p.progress);
            spans.push(Span::styled(p.title.clone(), row_fg(true)));
            spans.push(Span::styled(
                format!("  {}/{}", p.done, p.total),
                Style::default().fg(theme::TEXT_DIM),
            ));
            Line::from(spans)
        })
        .collect();
    if project_lines.is_empty() {
        project_lines.push(Line::styled(
            "No projects yet",
            Style::default().fg(theme::TEXT_DIM),
        ));
    }
    let projects = Paragraph::new(project_lines).block(panel(
        format!(" 1 · Projects ({}) ", summary.project_count),
        true,
    ));
    frame.render_widget(projects, columns[0]);

    let mut list_lines: Vec<Line> = summary
        .shopping_lists
        .iter()
        .map(|l| {
            Line::from(vec![
                Span::styled(l.name.clone(), row_fg(true)),
                Span::styled(
                    format!("  {} of {} left", l.remaining, l.total),
                    Style::default().fg(theme::TEXT_DIM),
                ),
            ])
        })
        .collect();
    if list_lines.is_empty() {
        list_lines.push(Line::styled(
            "No shopping lists yet",
            Style::default().fg(theme::TEXT_DIM),
        ));
    }
    let lists = Paragraph::new(list_lines).block(panel(
        format!(" 2 · Shopping ({}) ", summary.shopping_list_count),
        true,
    ));
    frame.render_widget(lists, columns[1]);
}

fn draw_projects<S: RemoteStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let projects = app.visible_projects();
    let items: Vec<ListItem> = projects
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let selected = i == app.project_idx;
            let mut spans = vec![marker(selected)];
            spans.extend(progress_spans(p.progress));
            spans.push(Span::styled(p.title.clone(), row_fg(selected)));
            spans.push(Span::styled(
                format!("  {}/{}", p.completed_count(), p.checklist.len()),
                Style::default().fg(theme::TEXT_DIM),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" Projects · sorted by {} ", app.sort);
    let mut list_state = ListState::default().with_selected(Some(app.project_idx));
    frame.render_stateful_widget(List::new(items).block(panel(title, true)), area, &mut list_state);
}

fn draw_project_detail<S: RemoteStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let Some(project) = app.current_project() else {
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Percentage(35),
        ])
        .split(area);

    let mut info = vec![Line::from(progress_spans(project.progress))];
    if project.description.is_empty() {
        info.push(Line::styled(
            "No description",
            Style::default().fg(theme::TEXT_DIM),
        ));
    } else {
        info.push(Line::styled(
            project.description.clone(),
            Style::default().fg(theme::BIRCH),
        ));
    }
    let header = Paragraph::new(info)
        .wrap(Wrap { trim: true })
        .block(panel(format!(" {} ", project.title), false));
    frame.render_widget(header, rows[0]);

    let items: Vec<ListItem> = project
        .checklist
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let selected = i == app.item_idx;
            ListItem::new(Line::from(vec![
                marker(selected),
                Span::styled(
                    format!("{} ", theme::check_symbol(item.completed)),
                    theme::check_style(item.completed),
                ),
                Span::styled(item.text.clone(), theme::check_style(item.completed)),
            ]))
        })
        .collect();
    let title = format!(
        " Checklist {}/{} ",
        project.completed_count(),
        project.checklist.len()
    );
    let mut list_state = ListState::default().with_selected(Some(app.item_idx));
    frame.render_stateful_widget(
        List::new(items).block(panel(title, true)),
        rows[1],
        &mut list_state,
    );

    let comments: Vec<Line> = project
        .comments
        .iter()
        .map(|c| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", c.created_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(theme::TEXT_DIM),
                ),
                Span::styled(format!("{}: ", c.author), Style::default().fg(theme::SEA)),
                Span::styled(c.text.clone(), Style::default().fg(theme::TEXT_BRIGHT)),
            ])
        })
        .collect();
    let comments = Paragraph::new(comments)
        .wrap(Wrap { trim: true })
        .block(panel(format!(" Comments ({}) ", project.comments.len()), false));
    frame.render_widget(comments, rows[2]);
}

fn draw_shopping_lists<S: RemoteStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let items: Vec<ListItem> = app
        .visible_lists()
        .iter()
        .enumerate()
        .map(|(i, list)| {
            let selected = i == app.list_idx;
            let mut spans = vec![marker(selected)];
            spans.extend(progress_spans(shopping_progress(list)));
            spans.push(Span::styled(list.name.clone(), row_fg(selected)));
            spans.push(Span::styled(
                format!("  {} of {} left", remaining_items(list), list.items.len()),
                Style::default().fg(theme::TEXT_DIM),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut list_state = ListState::default().with_selected(Some(app.list_idx));
    frame.render_stateful_widget(
        List::new(items).block(panel(" Shopping lists ", true)),
        area,
        &mut list_state,
    );
}

fn draw_shopping_detail<S: RemoteStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let Some(list) = app.current_list() else {
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(4)])
        .split(area);

    let mut items = Vec::new();
    let mut selected_row = 0;
    let mut index = 0;
    for group in crate::views::group_by_category(&list.items) {
        items.push(ListItem::new(Line::from(vec![
            Span::styled(
                group.category.as_str(),
                Style::default()
                    .fg(theme::SEA)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}/{}", group.completed, group.items.len()),
                Style::default().fg(theme::TEXT_DIM),
            ),
        ])));
        for item in group.items {
            let selected = index == app.item_idx;
            if selected {
                selected_row = items.len();
            }
            let mut spans = vec![
                marker(selected),
                Span::styled(
                    format!("{} ", theme::check_symbol(item.completed)),
                    theme::check_style(item.completed),
                ),
                Span::styled(item.name.clone(), theme::check_style(item.completed)),
            ];
            if let Some(quantity) = &item.quantity {
                spans.push(Span::styled(
                    format!("  {quantity}"),
                    Style::default().fg(theme::BIRCH),
                ));
            }
            spans.push(Span::styled(
                format!("  · {}", item.added_by),
                Style::default().fg(theme::TEXT_DIM),
            ));
            items.push(ListItem::new(Line::from(spans)));
            index += 1;
        }
    }

    let title = format!(
        " {} · {}% · {} left ",
        list.name,
        shopping_progress(list),
        remaining_items(list)
    );
    let mut list_state = ListState::default().with_selected(Some(selected_row));
    frame.render_stateful_widget(
        List::new(items).block(panel(title, true)),
        rows[0],
        &mut list_state,
    );

    let suggestions: Vec<Span> = app
        .quick_category
        .suggestions()
        .iter()
        .take(9)
        .enumerate()
        .flat_map(|(i, name)| {
            [
                Span::styled(format!("{} ", i + 1), Style::default().fg(theme::MOSS)),
                Span::styled(format!("{name}  "), Style::default().fg(theme::TEXT_BRIGHT)),
            ]
        })
        .collect();
    let quick = Paragraph::new(Line::from(suggestions))
        .wrap(Wrap { trim: true })
        .block(panel(
            format!(" Quick add · {} (c) ", app.quick_category),
            false,
        ));
    frame.render_widget(quick, rows[1]);
}

fn key_hints<S: RemoteStore>(app: &App<S>) -> &'static str {
    match app.mode {
        InputMode::Prompt(_) => "  Enter: save  Esc: cancel",
        InputMode::Confirm(_) => "  y: delete  any other key: keep",
        InputMode::Normal => match app.screen {
            Screen::UserSelect => "  j/k: move  Enter: choose  Esc: back  q: quit",
            Screen::Home => "  1: projects  2: shopping  u: switch user  r: reload  q: quit",
            Screen::Projects => {
                "  j/k: move  Enter: open  n: new  s: sort  D: delete  Esc: back  q: quit"
            }
            Screen::ProjectDetail => {
                "  j/k: move  Space: toggle  a: add  x: remove  c: comment  e: edit  D: delete  Esc: back"
            }
            Screen::ShoppingLists => {
                "  j/k: move  Enter: open  n: new  r: rename  D: delete  Esc: back  q: quit"
            }
            Screen::ShoppingDetail => {
                "  j/k: move  Space: check  a: add  1-9: quick add  c: category  x: remove  Esc: back"
            }
        },
    }
}

fn draw_footer<S: RemoteStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let line = match &app.status {
        Some(status) if status.is_error => {
            Line::from(Span::styled(format!("  {}", status.text), theme::error_style()))
        }
        Some(status) => Line::from(Span::styled(
            format!("  {}", status.text),
            Style::default().fg(theme::MEADOW),
        )),
        None => Line::from(Span::styled(
            key_hints(app),
            Style::default().fg(theme::TEXT_DIM),
        )),
    };
    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::panel_border(false))
            .title(Span::styled(" Help ", Style::default().fg(theme::TEXT_DIM)))
            .style(Style::default().bg(theme::BG)),
    );
    frame.render_widget(footer, area);
}

fn draw_overlay(frame: &mut Frame, title: &str, lines: Vec<Line>) {
    let height = lines.len() as u16 + 2;
    let area = centered(frame.area(), 60, height);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(panel(title.to_string(), true)),
        area,
    );
}

/// Rect of `width` columns and `height` rows centered in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocalCache;
    use crate::db::open_temp_db;
    use crate::state::AppState;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn rendered(app: &App<crate::db::Database>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn centered_clips_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered(area, 40, 4);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.y, 3);
    }

    #[test]
    fn home_shows_user_and_counts() {
        let (db, _db_dir) = open_temp_db();
        let cache_dir = TempDir::new().unwrap();
        let mut state = AppState::new(db, LocalCache::new(cache_dir.path()));
        state.load();
        state.select_user("Joakim").unwrap();
        state
            .create_project("Vedbod", "", &["Såga".to_string()])
            .unwrap();
        let app = App::new(state);

        let screen = rendered(&app);
        assert!(screen.contains("GRÄSÖS"));
        assert!(screen.contains("Joakim"));
        assert!(screen.contains("Projects (1)"));
        assert!(screen.contains("Vedbod"));
        assert!(screen.contains("No shopping lists yet"));
    }

    #[test]
    fn user_select_lists_family() {
        let (db, _db_dir) = open_temp_db();
        let cache_dir = TempDir::new().unwrap();
        let mut state = AppState::new(db, LocalCache::new(cache_dir.path()));
        state.load();
        let app = App::new(state);

        let screen = rendered(&app);
        for name in FAMILY_MEMBERS {
            assert!(screen.contains(name), "{name} missing");
        }
        assert!(screen.contains("No user selected"));
    }
}
