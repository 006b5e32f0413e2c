use super::project;
use crate::config::Config;
use crate::formats::collection;
use crate::row::Row;

fn lesson_rows() -> Vec<Row> {
    let doc = r#"{
      "type": "chapter_collection",
      "chapters": [
        {
          "name": "Begrüßungen",
          "primaryLanguage": "de",
          "secondaryLanguage": "ru",
          "topics": [
            {
              "primaryText": "Guten Morgen",
              "subtopics": [{ "primaryText": "Schönen Morgen!" }]
            }
          ]
        }
      ]
    }"#;
    collection::parse(doc, &Config::default()).unwrap()
}

#[test]
fn test_projection_starts_with_bom_and_header() {
    let csv = project(&lesson_rows()).unwrap();

    assert!(csv.starts_with('\u{feff}'), "BOM must lead the output");
    let header = csv.trim_start_matches('\u{feff}').lines().next().unwrap();
    assert_eq!(
        header,
        "\"Structure\",\"Chapter Name\",\"Lang-pri\",\"Lang-sec\",\"Primary\",\
         \"Primary (speech)\",\"Secondary\",\"Secondary (speech)\",\"Description\",\"Metadata\""
    );
}

#[test]
fn test_rows_end_with_crlf() {
    let csv = project(&lesson_rows()).unwrap();
    assert!(csv.contains("\r\n"));
    assert!(csv.ends_with("\r\n"));
}

#[test]
fn test_structure_column_indents_by_depth() {
    let csv = project(&lesson_rows()).unwrap();
    assert!(csv.contains("\"Begrüßungen\""));
    assert!(csv.contains("\"  Guten Morgen\""));
    assert!(csv.contains("\"    Schönen Morgen!\""));
}

#[test]
fn test_embedded_quotes_are_doubled() {
    let mut rows = lesson_rows();
    rows[0].name = r#"Say "hi" politely"#.to_string();

    let csv = project(&rows).unwrap();
    assert!(
        csv.contains(r#""Say ""hi"" politely""#),
        "quotes must be doubled inside quoted fields: {csv}"
    );
}

#[test]
fn test_inapplicable_columns_are_blank() {
    let csv = project(&lesson_rows()).unwrap();
    let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();

    // Chapter row: no primary text, but name and languages filled.
    assert_eq!(
        lines[1],
        "\"Begrüßungen\",\"Begrüßungen\",\"de\",\"ru\",\"\",\"\",\"\",\"\",\"\",\"\""
    );
    // Topic row: chapter columns blank, primary text filled.
    assert_eq!(
        lines[2],
        "\"  Guten Morgen\",\"\",\"\",\"\",\"Guten Morgen\",\"\",\"\",\"\",\"\",\"\""
    );
}
