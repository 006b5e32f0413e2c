//! rubric: a grid editor for chaptered content collections.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use edtui::EditorEventHandler;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rubric::app_state::{AppState, EditError, View};
use rubric::formats::{collection, table};
use rubric::{config, ui, validate};
use std::io;
use std::path::PathBuf;
use std::{fs, process};

/// Built-in demo collection for quick exploration.
const DEMO_DOCUMENT: &str = r#"{
  "type": "chapter_collection",
  "version": 1,
  "chapters": [
    {
      "name": "Begrüßungen",
      "primaryLanguage": "de",
      "secondaryLanguage": "ru",
      "description": "Deutsche Begrüßungen",
      "topics": [
        {
          "primaryText": "Guten Tag",
          "primaryTextSpeech": "Guten Tag",
          "secondaryText": "Добрый день",
          "subtopics": []
        },
        {
          "primaryText": "Guten Morgen",
          "primaryTextSpeech": "Guten Morgen",
          "secondaryText": "Доброе утро",
          "subtopics": [
            {
              "primaryText": "Schönen Morgen!",
              "secondaryText": "Прекрасного утра!"
            }
          ]
        },
        {
          "primaryText": "Hallo",
          "secondaryText": "Привет",
          "subtopics": []
        }
      ]
    }
  ]
}"#;

#[derive(Parser)]
#[command(name = "rubric")]
#[command(about = "Grid editing for chaptered content collections", long_about = None)]
struct Args {
    /// Chapter collection JSON file to edit
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Load the built-in demo collection instead of a file
    #[arg(long)]
    demo: bool,

    /// Project the collection to CSV and exit without opening the editor
    #[arg(long, value_name = "OUT")]
    csv: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let cfg = config::Config::load();

    let mut app = AppState::new(cfg.clone());
    if args.demo {
        match collection::parse(DEMO_DOCUMENT, &cfg) {
            Ok(rows) => app.load_rows(rows),
            Err(e) => {
                eprintln!("Demo import error: {e}");
                process::exit(1);
            }
        }
    } else if let Some(ref file) = args.file {
        match collection::read_file(file, &cfg) {
            Ok(rows) => {
                app.load_rows(rows);
                app.document_path = Some(file.clone());
            }
            Err(e) => {
                eprintln!("Import error: {e}");
                process::exit(1);
            }
        }
    } else {
        app.new_document();
    }

    if let Some(ref out) = args.csv {
        app.flush_pending();
        let csv = table::project(&app.rows)?;
        fs::write(out, csv)?;
        println!("Wrote {}", out.display());
        return Ok(());
    }

    run_tui(app)
}

fn run_tui(mut app: AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut editor_handler = EditorEventHandler::default();

    let result = run_app(&mut terminal, &mut app, &mut editor_handler);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S").to_string()
}

/// Map a structural-operation outcome to the status bar.
fn report(app: &mut AppState, result: Result<(), EditError>) {
    match result {
        Ok(()) => app.message = None,
        Err(e) => app.message = Some(e.to_string()),
    }
}

fn export_document(app: &mut AppState, arg: Option<&str>) {
    let validation = validate::validate_all(&app.rows);
    if let Some(first) = validation.first() {
        let count = validation.violations.len();
        app.focus_violation(first);
        app.message = Some(format!(
            "Please fill all mandatory fields ({count}). Required cells are highlighted."
        ));
        return;
    }

    let path = arg.map(PathBuf::from).or_else(|| app.document_path.clone());
    let path =
        path.unwrap_or_else(|| PathBuf::from(format!("chapter_collection_{}.json", timestamp())));
    match collection::write_file(&path, &app.rows) {
        Ok(()) => {
            app.message = Some(format!("Exported to {}", path.display()));
            app.document_path = Some(path);
        }
        Err(e) => app.message = Some(format!("Export error: {e}")),
    }
}

fn export_csv(app: &mut AppState, arg: Option<&str>) {
    let path = arg.map_or_else(
        || PathBuf::from(format!("content_export_{}.csv", timestamp())),
        PathBuf::from,
    );
    match table::project(&app.rows).and_then(|csv| fs::write(&path, csv)) {
        Ok(()) => app.message = Some(format!("Wrote {}", path.display())),
        Err(e) => app.message = Some(format!("CSV export error: {e}")),
    }
}

#[allow(clippy::too_many_lines)]
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    editor_handler: &mut EditorEventHandler,
) -> io::Result<()> {
    loop {
        // Deferred recomputations settle before anything is drawn, in the
        // order they were scheduled.
        app.flush_pending();
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            match app.view {
                View::Grid => {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('c') if ctrl => return Ok(()),
                        KeyCode::Up if ctrl => {
                            let result = app.move_row_up();
                            report(app, result);
                        }
                        KeyCode::Down if ctrl => {
                            let result = app.move_row_down();
                            report(app, result);
                        }
                        KeyCode::Left if ctrl => {
                            let result = app.promote();
                            report(app, result);
                        }
                        KeyCode::Right if ctrl => {
                            let result = app.demote();
                            report(app, result);
                        }
                        KeyCode::Up => app.focus_step(-1),
                        KeyCode::Down => app.focus_step(1),
                        KeyCode::Left => app.col_step(-1),
                        KeyCode::Right => app.col_step(1),
                        KeyCode::Enter => {
                            let result = app.begin_edit();
                            report(app, result);
                        }
                        KeyCode::Delete => match app.delete_focused(false) {
                            Err(EditError::CascadeNeedsConfirm) => {
                                app.view = View::ConfirmDelete;
                            }
                            result => report(app, result),
                        },
                        KeyCode::Char('c') => {
                            let result = app.add_chapter();
                            report(app, result);
                        }
                        KeyCode::Char('t') => {
                            let result = app.add_topic();
                            report(app, result);
                        }
                        KeyCode::Char('s') => {
                            let result = app.add_subtopic();
                            report(app, result);
                        }
                        KeyCode::Char('o') => {
                            let result = app.insert_below();
                            report(app, result);
                        }
                        KeyCode::Char('O') => {
                            let result = app.insert_above();
                            report(app, result);
                        }
                        KeyCode::Char('z') => app.toggle_collapsed(),
                        KeyCode::Char('Z') => app.toggle_all_collapsed(),
                        KeyCode::Char(':') => {
                            app.view = View::Command;
                            app.command_buffer.clear();
                            app.message = None;
                        }
                        _ => {}
                    }
                }
                View::ConfirmDelete => match key.code {
                    KeyCode::Char('y' | 'Y') => {
                        let result = app.delete_focused(true);
                        app.view = View::Grid;
                        report(app, result);
                    }
                    _ => {
                        app.view = View::Grid;
                        app.message = Some("Delete cancelled".to_string());
                    }
                },
                View::Edit => match key.code {
                    KeyCode::Char(':') => {
                        if let Some(ref editor_state) = app.editor_state {
                            if editor_state.mode == edtui::EditorMode::Normal {
                                app.view = View::Command;
                                app.command_buffer.clear();
                                app.message = None;
                            } else {
                                editor_handler
                                    .on_key_event(key, app.editor_state.as_mut().unwrap());
                            }
                        }
                    }
                    KeyCode::Esc => {
                        if let Some(ref editor_state) = app.editor_state {
                            if editor_state.mode == edtui::EditorMode::Normal {
                                app.close_edit(false);
                            } else {
                                editor_handler
                                    .on_key_event(key, app.editor_state.as_mut().unwrap());
                            }
                        }
                    }
                    _ => {
                        if let Some(ref mut editor_state) = app.editor_state {
                            editor_handler.on_key_event(key, editor_state);
                        }
                    }
                },
                View::Command => match key.code {
                    KeyCode::Char(c) => {
                        app.command_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.command_buffer.pop();
                    }
                    KeyCode::Esc => {
                        app.command_buffer.clear();
                        app.view = if app.editor_state.is_some() {
                            View::Edit
                        } else {
                            View::Grid
                        };
                    }
                    KeyCode::Enter => {
                        let cmd = app.command_buffer.clone();
                        app.command_buffer.clear();
                        let mut parts = cmd.split_whitespace();
                        let verb = parts.next().unwrap_or("");
                        let arg = parts.next();

                        match verb {
                            "w" => {
                                if app.editor_state.is_some() {
                                    app.save_edit();
                                    app.message = Some("Saved".to_string());
                                    app.view = View::Edit;
                                } else {
                                    app.view = View::Grid;
                                    export_document(app, arg);
                                }
                            }
                            "x" => {
                                if app.editor_state.is_some() {
                                    app.close_edit(true);
                                    app.message = Some("Saved".to_string());
                                } else {
                                    app.view = View::Grid;
                                }
                            }
                            "csv" => {
                                app.view = View::Grid;
                                export_csv(app, arg);
                            }
                            "new" => {
                                app.new_document();
                                app.message = Some("New document".to_string());
                            }
                            "q" | "q!" => {
                                if app.editor_state.is_some() {
                                    app.close_edit(false);
                                } else {
                                    return Ok(());
                                }
                            }
                            "" => {
                                app.view = if app.editor_state.is_some() {
                                    View::Edit
                                } else {
                                    View::Grid
                                };
                            }
                            _ => {
                                app.view = View::Grid;
                                app.message = Some(format!("Unknown command: {cmd}"));
                            }
                        }
                    }
                    _ => {}
                },
            }
        }
    }
}
