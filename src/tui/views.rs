//! TUI Views
//!
//! Rendering for the home screen, the open tool and the environment manager.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::App;
use super::colors;
use super::state::{Focus, ToolField};
use crate::catalog::ToolDescriptor;
use crate::controller::{ALL_CATEGORIES, ControllerState};
use crate::tools::{ToolWidget, Widget};

/// Draw the whole screen for the current state.
pub fn render(app: &App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5), Constraint::Length(2)])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    match app.session.state() {
        ControllerState::Loading => {
            frame.render_widget(Paragraph::new("Loading tools..."), chunks[1]);
        }
        ControllerState::Ready => render_home(app, frame, chunks[1]),
        ControllerState::ToolOpen => render_tool(app, frame, chunks[1]),
        ControllerState::EnvironmentSettingsOpen => render_environments(app, frame, chunks[1]),
    }
    render_footer(app, frame, chunks[2]);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" devhub ", Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD)),
        Span::styled(format!("│ {} ", app.session.state()), Style::default().fg(colors::DIM)),
    ];
    if let Some(name) = app.session.active_environment_name() {
        spans.push(Span::raw("│ env: "));
        spans.push(Span::styled(name.to_string(), Style::default().fg(colors::ACTIVE_ENV)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn keybinds(state: ControllerState, focus: Focus) -> &'static [(&'static str, &'static str)] {
    match (state, focus) {
        (ControllerState::Ready, Focus::Search) => &[("type", "search"), ("enter/esc", "done")],
        (ControllerState::Ready, Focus::Grid) => &[
            ("j/k", "move"),
            ("tab", "category"),
            ("/", "search"),
            ("enter", "open"),
            ("e", "environments"),
            ("q", "quit"),
        ],
        (ControllerState::ToolOpen, _) => &[
            ("tab", "field"),
            ("↑/↓", "action"),
            ("F5/^R", "run"),
            ("^U", "clear field"),
            ("esc", "close"),
        ],
        (ControllerState::EnvironmentSettingsOpen, _) => &[
            ("j/k", "move"),
            ("n", "new"),
            ("v", "variable"),
            ("a", "activate"),
            ("d", "delete"),
            ("esc", "close"),
        ],
        (ControllerState::Loading, _) => &[],
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();

    let binds: Vec<Span> = keybinds(app.session.state(), app.ui.focus)
        .iter()
        .flat_map(|(key, what)| {
            [
                Span::styled(format!("<{}>", key), Style::default().fg(colors::KEYBIND)),
                Span::styled(format!(" {}  ", what), Style::default().fg(colors::DIM)),
            ]
        })
        .collect();
    lines.push(Line::from(binds));

    if let Some(status) = &app.ui.status {
        let color = if status.is_error { colors::ERROR } else { colors::SUCCESS };
        lines.push(Line::from(Span::styled(status.text.clone(), Style::default().fg(color))));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

// Home

fn render_home(app: &App, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(20)])
        .split(area);

    render_categories(app, frame, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(columns[1]);
    render_search(app, frame, rows[0]);
    render_tool_list(app, frame, rows[1]);
}

fn render_categories(app: &App, frame: &mut Frame, area: Rect) {
    let selected = app.session.selected_category();
    let total = app.session.catalog().len();

    let mut items = vec![category_item("📦", "All", total, selected == ALL_CATEGORIES)];
    for entry in app.session.categories_with_counts() {
        let active = entry.category.id == selected;
        items.push(category_item(&entry.category.icon, &entry.category.name, entry.count, active));
    }

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Categories "));
    frame.render_widget(list, area);
}

fn category_item(icon: &str, name: &str, count: usize, active: bool) -> ListItem<'static> {
    let style = if active {
        Style::default().fg(colors::FOCUS).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    ListItem::new(Line::from(vec![
        Span::raw(format!("{} {} ", icon, name)),
        Span::styled(format!("({})", count), Style::default().fg(colors::DIM)),
    ]))
    .style(style)
}

fn render_search(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.ui.focus == Focus::Search;
    let border = if focused { colors::FOCUS } else { colors::DIM };
    let text = if focused {
        format!("{}▏", app.session.search_text())
    } else {
        app.session.search_text().to_string()
    };
    let search = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Search "),
    );
    frame.render_widget(search, area);
}

pub(crate) fn tool_item(tool: &ToolDescriptor) -> ListItem<'static> {
    let name_style = if tool.enabled {
        Style::default().fg(colors::ENABLED)
    } else {
        Style::default().fg(colors::DIM)
    };
    let mut spans = vec![
        Span::raw(format!("{} ", tool.icon)),
        Span::styled(tool.name.clone(), name_style.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" [{}]", tool.category), Style::default().fg(colors::DIM)),
    ];
    if !tool.enabled {
        spans.push(Span::styled(" Coming Soon", Style::default().fg(colors::COMING_SOON)));
    }
    spans.push(Span::raw(format!("  {}", tool.description)));
    ListItem::new(Line::from(spans))
}

fn render_tool_list(app: &App, frame: &mut Frame, area: Rect) {
    let tools = app.session.visible_tools();
    let title = format!(" Tools ({}) ", tools.len());

    if tools.is_empty() {
        let empty = Paragraph::new("No tools match.")
            .style(Style::default().fg(colors::DIM))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = tools.iter().map(tool_item).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(app.ui.selected_tool.min(tools.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}

// Tool view

fn render_tool(app: &App, frame: &mut Frame, area: Rect) {
    let Some(widget) = app.session.current_widget() else {
        return;
    };
    let descriptor = widget.descriptor();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(widget.actions().len() as u16 + 2),
            Constraint::Min(4),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(4),
        ])
        .split(columns[0]);

    let actions: Vec<ListItem> = widget.actions().iter().map(|a| ListItem::new(*a)).collect();
    let list = List::new(actions)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} {} ", descriptor.icon, descriptor.name)),
        )
        .highlight_style(Style::default().fg(colors::FOCUS).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(app.ui.tool.action));
    frame.render_stateful_widget(list, left[0], &mut state);

    let fields = [ToolField::Text, ToolField::Secondary, ToolField::Options, ToolField::Files];
    for (field, area) in fields.into_iter().zip(left.iter().skip(1)) {
        render_field(app, frame, *area, field);
    }

    render_output(app, widget, frame, columns[1]);
}

fn render_field(app: &App, frame: &mut Frame, area: Rect, field: ToolField) {
    let focused = app.ui.tool.field == field;
    let border = if focused { colors::FOCUS } else { colors::DIM };
    let mut text = app.ui.tool.buffer(field).to_string();
    if focused {
        text.push('▏');
    }
    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", field.title())),
    );
    frame.render_widget(paragraph, area);
}

fn render_output(app: &App, widget: &Widget, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    let mut style = Style::default();

    if let Some(output) = &app.ui.tool.output {
        if output.is_error {
            style = style.fg(colors::ERROR);
        }
        lines.extend(output.content.lines().map(|l| Line::from(l.to_string())));
    }

    // Listener logs grow between key presses, so they are read on every frame
    if let Some(listener) = widget.as_listener() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            format!("{} │ received: {}", listener.status(), listener.received_count()),
            Style::default().fg(colors::HEADER),
        )));
        lines.extend(listener.render_log().lines().map(|l| Line::from(l.to_string())));
    }

    let output = Paragraph::new(lines)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Output "));
    frame.render_widget(output, area);
}

// Environments

fn render_environments(app: &App, frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    let envs = app.environments();
    let active = app.session.environments().active_id();

    let items: Vec<ListItem> = envs
        .iter()
        .map(|env| {
            let is_active = active.as_deref() == Some(env.id_str());
            let marker = if is_active { "● " } else { "○ " };
            let color = if is_active { colors::ACTIVE_ENV } else { colors::DIM };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(color)),
                Span::raw(env.name.clone()),
                Span::styled(
                    format!(" ({}/{} set)", env.configured_count(), env.variables.len()),
                    Style::default().fg(colors::DIM),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Environments ({}) ", envs.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let selected = (!envs.is_empty()).then_some(app.ui.env.selected);
    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, columns[0], &mut state);

    let variables: Vec<Line> = match envs.get(app.ui.env.selected) {
        Some(env) => env
            .variables
            .iter()
            .map(|(k, v)| {
                Line::from(vec![
                    Span::styled(format!("{{{{{}}}}}", k), Style::default().fg(colors::KEYBIND)),
                    Span::raw(" = "),
                    Span::raw(v.clone()),
                ])
            })
            .collect(),
        None => vec![Line::from(Span::styled(
            "No environments yet. Press n to create one.",
            Style::default().fg(colors::DIM),
        ))],
    };
    let details = Paragraph::new(variables)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Variables "));
    frame.render_widget(details, columns[1]);

    let (title, text) = match &app.ui.env.prompt {
        Some(prompt) => (prompt.kind.title(), format!("{}▏", prompt.buffer)),
        None => ("Prompt", String::new()),
    };
    let prompt = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    frame.render_widget(prompt, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSource;
    use crate::controller::AppSession;
    use crate::storage::{MemoryStore, SharedStore};
    use crate::tui::app::AppConfig;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;

    fn app() -> App {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut app = App::new(AppSession::with_store(store), AppConfig::default());
        app.load(&CatalogSource::Builtin).unwrap();
        app
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(app, f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_home() {
        let screen = draw(&app());
        assert!(screen.contains("devhub"));
        assert!(screen.contains("Categories"));
        assert!(screen.contains("JSON Beautifier"));
    }

    #[test]
    fn test_render_tool_view() {
        let mut app = app();
        app.session.open_tool("base64-encoder").unwrap();
        let screen = draw(&app);
        assert!(screen.contains("encode"));
        assert!(screen.contains("Output"));
    }

    #[test]
    fn test_render_environment_manager() {
        let mut app = app();
        app.session.open_environment_settings().unwrap();
        let screen = draw(&app);
        assert!(screen.contains("Environments (0)"));
    }

    #[test]
    fn test_keybinds_per_state() {
        assert!(keybinds(ControllerState::Ready, Focus::Grid).iter().any(|(k, _)| *k == "q"));
        assert!(keybinds(ControllerState::ToolOpen, Focus::Grid).iter().any(|(_, w)| *w == "run"));
        assert!(keybinds(ControllerState::Loading, Focus::Grid).is_empty());
    }

    #[test]
    fn test_disabled_tool_item() {
        let tool = ToolDescriptor::new("jwt-decoder", "JWT").disabled();
        let _item = tool_item(&tool);
    }
}
