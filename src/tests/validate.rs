use super::{is_blank, missing_fields, row_is_valid, validate_all};
use crate::row::{Field, Row};

fn chapter(name: &str) -> Row {
    let mut row = Row::blank_chapter("de", "ru");
    row.name = name.to_string();
    row
}

fn topic(chapter_id: &str, text: &str) -> Row {
    let mut row = Row::blank_topic(chapter_id);
    row.primary_text = text.to_string();
    row
}

#[test]
fn test_whitespace_only_counts_as_blank() {
    assert!(is_blank(""));
    assert!(is_blank("   \t"));
    assert!(!is_blank(" x "));
}

#[test]
fn test_complete_rows_pass() {
    let chapter = chapter("Begrüßungen");
    let topic = topic(&chapter.id, "Guten Tag");
    assert!(row_is_valid(&chapter));
    assert!(row_is_valid(&topic));
    assert!(validate_all(&[chapter, topic]).is_clean());
}

#[test]
fn test_blank_chapter_name_blocks_export() {
    let blank = chapter("   ");
    let topic = topic(&blank.id, "Guten Tag");
    let report = validate_all(&[blank, topic]);

    assert!(!report.is_clean());
    let first = report.first().unwrap();
    assert_eq!(first.row_index, 0);
    assert_eq!(first.field, Field::Name);
}

#[test]
fn test_violations_listed_in_row_then_field_order() {
    let mut bare = chapter("");
    bare.primary_language = String::new();
    let empty_topic = topic(&bare.id, "");
    let report = validate_all(&[bare, empty_topic]);

    let summary: Vec<(usize, Field)> = report
        .violations
        .iter()
        .map(|violation| (violation.row_index, violation.field))
        .collect();
    assert_eq!(
        summary,
        vec![
            (0, Field::Name),
            (0, Field::PrimaryLanguage),
            (1, Field::PrimaryText),
        ]
    );
}

#[test]
fn test_missing_fields_names_the_blank_ones() {
    let mut row = chapter("Named");
    row.primary_language = "  ".to_string();
    assert_eq!(missing_fields(&row), vec![Field::PrimaryLanguage]);
}
