use super::{AppState, EditError, View};
use crate::config::Config;
use crate::formats::collection;
use crate::row::Field;

const GREETINGS: &str = r#"{
  "type": "chapter_collection",
  "chapters": [
    {
      "name": "Begrüßungen",
      "primaryLanguage": "de",
      "secondaryLanguage": "ru",
      "topics": [
        { "primaryText": "Guten Tag", "subtopics": [] },
        {
          "primaryText": "Guten Morgen",
          "subtopics": [{ "primaryText": "Schönen Morgen!" }]
        },
        { "primaryText": "Hallo", "subtopics": [] }
      ]
    },
    {
      "name": "Zahlen",
      "primaryLanguage": "de",
      "topics": [
        { "primaryText": "Eins", "subtopics": [] },
        { "primaryText": "Zwei", "subtopics": [] }
      ]
    }
  ]
}"#;

const SOLO: &str = r#"{
  "type": "chapter_collection",
  "chapters": [
    {
      "name": "Solo",
      "primaryLanguage": "de",
      "topics": [
        { "primaryText": "A", "subtopics": [{ "primaryText": "A1" }] },
        { "primaryText": "B", "subtopics": [] }
      ]
    }
  ]
}"#;

fn app_from(doc: &str) -> AppState {
    let config = Config::default();
    let rows = collection::parse(doc, &config).unwrap();
    let mut app = AppState::new(config);
    app.load_rows(rows);
    app.flush_pending();
    app
}

fn index_of(app: &AppState, name: &str) -> usize {
    app.rows
        .iter()
        .position(|row| row.display_name() == name)
        .unwrap_or_else(|| panic!("no row named {name}"))
}

fn names(app: &AppState) -> Vec<String> {
    app.rows
        .iter()
        .map(|row| row.display_name().to_string())
        .collect()
}

#[test]
fn test_import_builds_flat_sequence() {
    let app = app_from(GREETINGS);

    let depths: Vec<usize> = app.rows.iter().map(|row| row.depth()).collect();
    assert_eq!(depths, vec![1, 2, 2, 3, 2, 1, 2, 2]);

    for row in &app.rows {
        assert_eq!(row.path.last().unwrap(), &row.id, "path must end in own id");
        assert!(
            app.rows
                .iter()
                .any(|other| other.is_chapter() && other.id == row.path[0]),
            "chapter prefix must name an existing chapter"
        );
    }

    let mut ids: Vec<&str> = app.rows.iter().map(|row| row.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), app.rows.len(), "row ids must be unique");
}

#[test]
fn test_has_children_recompute_is_deferred() {
    let mut app = app_from(GREETINGS);
    let guten_tag = index_of(&app, "Guten Tag");
    assert!(!app.rows[guten_tag].has_children);

    app.cursor_row = guten_tag;
    app.add_subtopic().unwrap();

    assert!(
        !app.rows[guten_tag].has_children,
        "flag should not change before the queue is flushed"
    );
    app.flush_pending();
    assert!(app.rows[guten_tag].has_children);
}

#[test]
fn test_insert_focus_lands_on_first_editable_field() {
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Begrüßungen");

    app.add_topic().unwrap();

    assert_eq!(app.cursor_row, 1, "new topic sits right after the reference");
    assert!(app.rows[1].is_topic());
    assert_eq!(app.focused_field(), Field::PrimaryText);
    assert!(app.view == View::Edit, "editing should begin immediately");
    assert!(app.editor_state.is_some());
}

#[test]
fn test_add_chapter_inherits_languages_from_focused_chapter() {
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Begrüßungen");

    app.add_chapter().unwrap();

    let added = &app.rows[app.cursor_row];
    assert!(added.is_chapter());
    assert_eq!(added.primary_language, "de");
    assert_eq!(added.secondary_language, "ru");
    assert_eq!(app.focused_field(), Field::Name);
}

#[test]
fn test_add_subtopic_rejected_on_chapter_row() {
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Begrüßungen");

    let before = names(&app);
    assert_eq!(app.add_subtopic(), Err(EditError::SubtopicNeedsTopic));
    assert_eq!(names(&app), before);
}

#[test]
fn test_promote_then_demote_restores_path() {
    let mut app = app_from(GREETINGS);
    let subtopic = index_of(&app, "Schönen Morgen!");
    let original_path = app.rows[subtopic].path.clone();

    app.cursor_row = subtopic;
    app.promote().unwrap();
    assert_eq!(app.rows[subtopic].depth(), 2);
    assert_eq!(app.rows[subtopic].path[1], app.rows[subtopic].id);

    app.demote().unwrap();
    assert_eq!(app.rows[subtopic].path, original_path);
}

#[test]
fn test_promote_rejected_for_topic() {
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Hallo");
    assert_eq!(app.promote(), Err(EditError::NotASubtopic));
}

#[test]
fn test_demote_first_topic_rejected() {
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Guten Tag");
    let before: Vec<Vec<String>> = app.rows.iter().map(|row| row.path.clone()).collect();

    assert_eq!(app.demote(), Err(EditError::NoPreviousTopic));

    let after: Vec<Vec<String>> = app.rows.iter().map(|row| row.path.clone()).collect();
    assert_eq!(before, after, "rejected demote must not touch the sequence");
}

#[test]
fn test_demote_stops_at_chapter_boundary() {
    // "Eins" is the first topic of the second chapter; the previous depth-2
    // row in the sequence belongs to another chapter and must not be found.
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Eins");
    assert_eq!(app.demote(), Err(EditError::NoPreviousTopic));
}

#[test]
fn test_reorder_involution() {
    let mut app = app_from(GREETINGS);
    let before = names(&app);

    app.cursor_row = index_of(&app, "Guten Morgen");
    app.move_row_up().unwrap();
    assert_ne!(names(&app), before);
    app.move_row_down().unwrap();

    assert_eq!(names(&app), before, "up then down must restore the order");
}

#[test]
fn test_reorder_rejects_crossing_chapter_boundary() {
    let mut app = app_from(GREETINGS);
    let before = names(&app);

    app.cursor_row = index_of(&app, "Hallo");
    assert_eq!(app.move_row_down(), Err(EditError::ChapterBoundary));

    app.cursor_row = index_of(&app, "Eins");
    assert_eq!(app.move_row_up(), Err(EditError::ChapterBoundary));

    assert_eq!(names(&app), before);
}

#[test]
fn test_reorder_rejects_chapter_rows() {
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Zahlen");
    assert_eq!(app.move_row_up(), Err(EditError::NotReorderable));
}

#[test]
fn test_reorder_guard_keeps_subtopic_off_first_slot() {
    let mut app = app_from(SOLO);
    let before = names(&app);

    app.cursor_row = index_of(&app, "A1");
    assert_eq!(app.move_row_up(), Err(EditError::SubtopicWouldLeadChapter));

    app.cursor_row = index_of(&app, "A");
    assert_eq!(app.move_row_down(), Err(EditError::SubtopicWouldLeadChapter));

    assert_eq!(names(&app), before);
}

#[test]
fn test_delete_topic_reparents_subtopics() {
    let mut app = app_from(GREETINGS);
    let guten_tag_id = app.rows[index_of(&app, "Guten Tag")].id.clone();

    app.cursor_row = index_of(&app, "Guten Morgen");
    app.delete_focused(false).unwrap();

    assert!(
        !names(&app).contains(&"Guten Morgen".to_string()),
        "deleted topic must be gone"
    );
    let subtopic = &app.rows[index_of(&app, "Schönen Morgen!")];
    assert_eq!(subtopic.depth(), 3);
    assert_eq!(subtopic.path[1], guten_tag_id, "subtopic moves to the previous topic");
    assert_eq!(subtopic.path.last().unwrap(), &subtopic.id);

    assert_eq!(
        app.focused().unwrap().display_name(),
        "Guten Tag",
        "focus lands on the reparent target"
    );
}

#[test]
fn test_delete_first_topic_rejected() {
    let mut app = app_from(GREETINGS);
    let before = names(&app);

    app.cursor_row = index_of(&app, "Guten Tag");
    assert_eq!(app.delete_focused(false), Err(EditError::NoReparentTarget));
    assert_eq!(names(&app), before);
}

#[test]
fn test_delete_subtopic_removes_only_that_row() {
    let mut app = app_from(GREETINGS);
    let count = app.rows.len();

    app.cursor_row = index_of(&app, "Schönen Morgen!");
    app.delete_focused(false).unwrap();

    assert_eq!(app.rows.len(), count - 1);
    assert!(names(&app).contains(&"Guten Morgen".to_string()));
}

#[test]
fn test_delete_chapter_requires_confirmation_then_cascades() {
    let mut app = app_from(GREETINGS);
    let count = app.rows.len();

    app.cursor_row = index_of(&app, "Begrüßungen");
    assert_eq!(app.delete_focused(false), Err(EditError::CascadeNeedsConfirm));
    assert_eq!(app.rows.len(), count, "unconfirmed delete must not remove anything");

    app.delete_focused(true).unwrap();
    assert_eq!(names(&app), vec!["Zahlen", "Eins", "Zwei"]);
}

#[test]
fn test_collapse_hides_descendants_without_touching_rows() {
    let mut app = app_from(GREETINGS);
    let count = app.rows.len();
    let subtopic = index_of(&app, "Schönen Morgen!");

    app.cursor_row = index_of(&app, "Guten Morgen");
    app.toggle_collapsed();

    let visible = app.visible_indices();
    assert!(!visible.contains(&subtopic), "collapsed descendant is hidden");
    assert_eq!(visible.len(), count - 1);
    assert_eq!(app.rows.len(), count, "collapsing never alters the sequence");

    app.toggle_collapsed();
    assert_eq!(app.visible_indices().len(), count);
}

#[test]
fn test_load_rows_resets_collapse_state() {
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Guten Morgen");
    app.toggle_collapsed();
    assert!(!app.collapsed.is_empty());

    let rows = collection::parse(SOLO, &app.config).unwrap();
    app.load_rows(rows);
    assert!(app.collapsed.is_empty());
}

#[test]
fn test_new_document_seeds_chapter_and_topic() {
    let mut app = AppState::new(Config::default());
    app.new_document();

    assert_eq!(app.rows.len(), 2);
    let chapter = &app.rows[0];
    assert!(chapter.is_chapter());
    assert_eq!(chapter.name, "New chapter");
    assert_eq!(chapter.primary_language, "de");
    assert_eq!(chapter.secondary_language, "ru");

    let topic = &app.rows[1];
    assert!(topic.is_topic());
    assert_eq!(topic.path[0], chapter.id);
    assert_eq!(topic.path.last().unwrap(), &topic.id);
}

#[test]
fn test_save_edit_writes_focused_cell() {
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Hallo");
    app.begin_edit().unwrap();

    if let Some(ref mut editor_state) = app.editor_state {
        editor_state.lines = edtui::Lines::from("\nServus\n");
    }
    app.close_edit(true);

    assert_eq!(app.rows[app.cursor_row].primary_text, "Servus");
    assert!(app.view == View::Grid);
}

#[test]
fn test_begin_edit_rejects_foreign_column() {
    let mut app = app_from(GREETINGS);
    app.cursor_row = index_of(&app, "Hallo");
    // Column 0 is the chapter name, which topic rows do not carry.
    app.cursor_col = 0;
    assert_eq!(app.begin_edit(), Err(EditError::CellNotEditable));
}
