//! The UI renders the application state into something visible and vim-able.
//!
//! The draw function dispatches based on the current view (grid, cell editor,
//! command line, or delete confirmation). The grid view shows the row
//! sequence as a table: hierarchy is indentation plus a fold caret in the
//! structure column, rows missing required fields are highlighted, and cells
//! outside a row's field set render dimmed. The surface only reads state the
//! core computes; it never mutates the sequence itself.

use crate::app_state::{AppState, View};
use crate::row::{Field, Row, RowKind};
use crate::validate;
use edtui::{EditorTheme, EditorView};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row as GridRow, Table},
    Frame,
};
use std::collections::HashSet;

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &mut AppState) {
    match app.view {
        View::Grid => {
            let footer = status_text(app);
            draw_grid(f, app, &footer);
        }
        View::Command => {
            let footer = format!(":{}", app.command_buffer);
            draw_grid(f, app, &footer);
        }
        View::ConfirmDelete => {
            draw_grid(f, app, "Delete the chapter and all its children? (y/N)");
        }
        View::Edit => draw_edit(f, app),
    }
}

fn status_text(app: &AppState) -> String {
    if let Some(ref message) = app.message {
        return message.clone();
    }
    "\u{2191}/\u{2193}/\u{2190}/\u{2192}: Navigate | Enter: Edit | c/t/s: Add | o/O: Insert | \
     Ctrl+\u{2190}/\u{2192}: Promote/Demote | Ctrl+\u{2191}/\u{2193}: Move | z/Z: Fold | \
     Del: Delete | :: Cmd | q: Quit"
        .to_string()
}

fn structure_text(row: &Row) -> String {
    let indent = "  ".repeat(row.depth() - 1);
    let caret = if row.has_children { "\u{25be} " } else { "" };
    format!("{indent}{caret}{}", row.display_name())
}

fn collapsed_structure_text(row: &Row) -> String {
    let indent = "  ".repeat(row.depth() - 1);
    format!("{indent}\u{25b8} {}", row.display_name())
}

#[allow(clippy::too_many_lines)]
fn draw_grid(f: &mut Frame, app: &AppState, footer: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let report = validate::validate_all(&app.rows);
    let invalid_rows: HashSet<usize> = report
        .violations
        .iter()
        .map(|violation| violation.row_index)
        .collect();
    let invalid_cells: HashSet<(usize, Field)> = report
        .violations
        .iter()
        .map(|violation| (violation.row_index, violation.field))
        .collect();

    let visible = app.visible_indices();
    let grid_rows: Vec<GridRow> = visible
        .iter()
        .map(|&index| {
            let row = &app.rows[index];

            let structure = if app.collapsed.contains(&row.path_key()) {
                collapsed_structure_text(row)
            } else {
                structure_text(row)
            };
            let structure_style = if row.kind == RowKind::Chapter {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mut cells = vec![Cell::from(Span::styled(structure, structure_style))];

            for (col, field) in Field::ALL.iter().enumerate() {
                let text = if row.editable(*field) {
                    row.get(*field).to_string()
                } else {
                    String::new()
                };
                let mut style = Style::default();
                if !row.editable(*field) {
                    style = style.fg(Color::DarkGray);
                }
                if invalid_cells.contains(&(index, *field)) {
                    style = style.fg(Color::Red).add_modifier(Modifier::BOLD);
                }
                if index == app.cursor_row && col == app.cursor_col {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                cells.push(Cell::from(Span::styled(text, style)));
            }

            let grid_row = GridRow::new(cells);
            if invalid_rows.contains(&index) {
                grid_row.style(Style::default().fg(Color::Red))
            } else {
                grid_row
            }
        })
        .collect();

    let header_cells: Vec<Cell> = std::iter::once("Structure")
        .chain(Field::ALL.iter().map(|field| field.label()))
        .map(|label| {
            Cell::from(Span::styled(
                label,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
        })
        .collect();
    let header = GridRow::new(header_cells).bottom_margin(1);

    let mut widths = vec![Constraint::Min(24)];
    widths.extend(Field::ALL.iter().map(|field| match field {
        Field::PrimaryLanguage | Field::SecondaryLanguage => Constraint::Length(8),
        _ => Constraint::Length(16),
    }));

    let title = if report.is_clean() {
        format!("Chapters & Topics ({} rows)", app.rows.len())
    } else {
        format!(
            "Chapters & Topics ({} rows, {} missing fields)",
            app.rows.len(),
            report.violations.len()
        )
    };

    let table = Table::new(grid_rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, chunks[0]);

    let footer_widget = Paragraph::new(footer).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer_widget, chunks[1]);
}

fn breadcrumb(app: &AppState) -> String {
    let Some(row) = app.focused() else {
        return String::new();
    };
    let mut parts = Vec::new();
    for depth in 1..=row.path.len() {
        let id = &row.path[depth - 1];
        let name = app
            .rows
            .iter()
            .find(|candidate| candidate.id == *id)
            .map_or("", |candidate| candidate.display_name());
        if name.is_empty() {
            parts.push("(untitled)".to_string());
        } else {
            parts.push(name.to_string());
        }
    }
    parts.join(" > ")
}

fn draw_edit(f: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Breadcrumb
            Constraint::Min(0),    // Editor
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let breadcrumb_widget = Paragraph::new(breadcrumb(app))
        .block(Block::default().borders(Borders::ALL).title("Navigation"));
    f.render_widget(breadcrumb_widget, chunks[0]);

    let title = format!("Edit: {}", app.focused_field().label());
    if let Some(ref mut editor_state) = app.editor_state {
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(chunks[1]);
        f.render_widget(block, chunks[1]);

        let editor = EditorView::new(editor_state)
            .theme(EditorTheme::default())
            .wrap(true);
        f.render_widget(editor, inner);
    }

    let help_text = if let Some(ref message) = app.message {
        message.clone()
    } else {
        ":w Save | :x Save & Close | Esc: Discard".to_string()
    };
    let help = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
