//! Row representation for the editable content grid.
//!
//! A row is the sole entity in the collection: chapters at depth 1, topics at
//! depth 2, and subtopics at depth 3 (subtopics share the topic field set,
//! one level deeper). Ancestry is encoded in `path`, an ordered chain of ids
//! from the chapter down to the row itself, so `path.len()` is the depth and
//! the last element is always the row's own id.

use uuid::Uuid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// Discriminates the two field sets a row can carry.
pub enum RowKind {
    /// Depth-1 grouping row with name and language fields.
    Chapter,
    /// Depth-2 or depth-3 content row with text and speech fields.
    Topic,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// An editable column of the grid.
pub enum Field {
    /// Chapter display name.
    Name,
    /// Chapter primary (taught) language code.
    PrimaryLanguage,
    /// Chapter secondary (translation) language code.
    SecondaryLanguage,
    /// Topic text in the primary language.
    PrimaryText,
    /// Speech variant of the primary text.
    PrimaryTextSpeech,
    /// Topic text in the secondary language.
    SecondaryText,
    /// Speech variant of the secondary text.
    SecondaryTextSpeech,
    /// Free-form description, any row kind.
    Description,
    /// Free-form metadata blob, any row kind.
    Metadata,
}

impl Field {
    /// Every field column in on-screen order.
    pub const ALL: [Field; 9] = [
        Field::Name,
        Field::PrimaryLanguage,
        Field::SecondaryLanguage,
        Field::PrimaryText,
        Field::PrimaryTextSpeech,
        Field::SecondaryText,
        Field::SecondaryTextSpeech,
        Field::Description,
        Field::Metadata,
    ];

    #[must_use]
    /// Column header text as shown in the grid and the CSV projection.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Chapter Name",
            Field::PrimaryLanguage => "Lang-pri",
            Field::SecondaryLanguage => "Lang-sec",
            Field::PrimaryText => "Primary",
            Field::PrimaryTextSpeech => "Primary (speech)",
            Field::SecondaryText => "Secondary",
            Field::SecondaryTextSpeech => "Secondary (speech)",
            Field::Description => "Description",
            Field::Metadata => "Metadata",
        }
    }

    #[must_use]
    /// The fields a row of the given kind may edit, in column order.
    ///
    /// The first entry is the "first editable field" that receives focus
    /// after an insertion.
    pub fn for_kind(kind: RowKind) -> &'static [Field] {
        match kind {
            RowKind::Chapter => &[
                Field::Name,
                Field::PrimaryLanguage,
                Field::SecondaryLanguage,
                Field::Description,
                Field::Metadata,
            ],
            RowKind::Topic => &[
                Field::PrimaryText,
                Field::PrimaryTextSpeech,
                Field::SecondaryText,
                Field::SecondaryTextSpeech,
                Field::Description,
                Field::Metadata,
            ],
        }
    }

    #[must_use]
    /// The fields that must be non-blank for a row of the given kind.
    pub fn required_for(kind: RowKind) -> &'static [Field] {
        match kind {
            RowKind::Chapter => &[Field::Name, Field::PrimaryLanguage],
            RowKind::Topic => &[Field::PrimaryText],
        }
    }
}

#[must_use]
/// Generate a fresh opaque row id with a kind prefix (`ch_`, `t_`, `s_`).
pub fn fresh_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &hex[..12])
}

#[must_use]
/// Join a path (or path prefix) into the key used for collapse tracking and
/// child counting.
pub fn prefix_key(path: &[String]) -> String {
    path.join("|")
}

#[derive(Clone, Debug)]
/// One entry of the flat row sequence.
///
/// All content fields are stored as plain strings; a blank value means the
/// field is unset. Normalisation to an explicit absent marker happens only at
/// document export.
pub struct Row {
    /// Opaque unique identifier, stable for the row's lifetime.
    pub id: String,
    /// Which field set this row carries.
    pub kind: RowKind,
    /// Ancestor-id chain ending in this row's own id; length 1 to 3.
    pub path: Vec<String>,
    /// Chapter display name.
    pub name: String,
    /// Chapter primary language code.
    pub primary_language: String,
    /// Chapter secondary language code.
    pub secondary_language: String,
    /// Topic text in the primary language.
    pub primary_text: String,
    /// Speech variant of the primary text.
    pub primary_text_speech: String,
    /// Topic text in the secondary language.
    pub secondary_text: String,
    /// Speech variant of the secondary text.
    pub secondary_text_speech: String,
    /// Free-form description.
    pub description: String,
    /// Free-form metadata blob.
    pub metadata: String,
    /// Derived: whether any row in the sequence lists this row as an
    /// ancestor. Recomputed by the deferred task queue, not maintained
    /// inline.
    pub has_children: bool,
}

impl Row {
    fn blank(id: String, kind: RowKind, path: Vec<String>) -> Self {
        Self {
            id,
            kind,
            path,
            name: String::new(),
            primary_language: String::new(),
            secondary_language: String::new(),
            primary_text: String::new(),
            primary_text_speech: String::new(),
            secondary_text: String::new(),
            secondary_text_speech: String::new(),
            description: String::new(),
            metadata: String::new(),
            has_children: false,
        }
    }

    #[must_use]
    /// A new empty chapter row with the given language defaults.
    pub fn blank_chapter(primary_language: &str, secondary_language: &str) -> Self {
        let id = fresh_id("ch");
        let mut row = Self::blank(id.clone(), RowKind::Chapter, vec![id]);
        row.primary_language = primary_language.to_string();
        row.secondary_language = secondary_language.to_string();
        row
    }

    #[must_use]
    /// A new empty topic row under the given chapter.
    pub fn blank_topic(chapter_id: &str) -> Self {
        let id = fresh_id("t");
        Self::blank(
            id.clone(),
            RowKind::Topic,
            vec![chapter_id.to_string(), id],
        )
    }

    #[must_use]
    /// A new empty subtopic row under the given chapter and topic.
    pub fn blank_subtopic(chapter_id: &str, topic_id: &str) -> Self {
        let id = fresh_id("s");
        Self::blank(
            id.clone(),
            RowKind::Topic,
            vec![chapter_id.to_string(), topic_id.to_string(), id],
        )
    }

    #[must_use]
    /// Nesting depth: 1 for chapters, 2 for topics, 3 for subtopics.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    /// The id of the chapter this row belongs to (its own id for chapters).
    pub fn chapter_id(&self) -> &str {
        &self.path[0]
    }

    #[must_use]
    /// True for depth-1 rows.
    pub fn is_chapter(&self) -> bool {
        self.depth() == 1
    }

    #[must_use]
    /// True for depth-2 topic rows.
    pub fn is_topic(&self) -> bool {
        self.kind == RowKind::Topic && self.depth() == 2
    }

    #[must_use]
    /// True for depth-3 topic rows.
    pub fn is_subtopic(&self) -> bool {
        self.kind == RowKind::Topic && self.depth() == 3
    }

    #[must_use]
    /// Collapse/child-count key for this row.
    pub fn path_key(&self) -> String {
        prefix_key(&self.path)
    }

    #[must_use]
    /// The text shown in the structure column: chapter name or primary text.
    pub fn display_name(&self) -> &str {
        match self.kind {
            RowKind::Chapter => &self.name,
            RowKind::Topic => &self.primary_text,
        }
    }

    #[must_use]
    /// Whether the given field belongs to this row's kind.
    pub fn editable(&self, field: Field) -> bool {
        Field::for_kind(self.kind).contains(&field)
    }

    #[must_use]
    /// Read a field value. Fields outside this row's kind read as stored
    /// (normally blank); the display surface masks them.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::PrimaryLanguage => &self.primary_language,
            Field::SecondaryLanguage => &self.secondary_language,
            Field::PrimaryText => &self.primary_text,
            Field::PrimaryTextSpeech => &self.primary_text_speech,
            Field::SecondaryText => &self.secondary_text,
            Field::SecondaryTextSpeech => &self.secondary_text_speech,
            Field::Description => &self.description,
            Field::Metadata => &self.metadata,
        }
    }

    /// Write a field value.
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::PrimaryLanguage => self.primary_language = value,
            Field::SecondaryLanguage => self.secondary_language = value,
            Field::PrimaryText => self.primary_text = value,
            Field::PrimaryTextSpeech => self.primary_text_speech = value,
            Field::SecondaryText => self.secondary_text = value,
            Field::SecondaryTextSpeech => self.secondary_text_speech = value,
            Field::Description => self.description = value,
            Field::Metadata => self.metadata = value,
        }
    }
}
