//! The core state machine bridging the row sequence and the interactive grid.
//!
//! A grid surface needs a single source of truth that can be interrogated and
//! mutated as the user navigates and edits. `AppState` owns the flat,
//! path-addressed row sequence, the focused cell, the transient collapse set,
//! and a FIFO queue of deferred recomputations. Every structural operation
//! reads the sequence as of the start of the operation, decides the full
//! mutation, then applies it in one batch, so neither validation nor export
//! can observe a half-applied edit.

use crate::config::Config;
use crate::row::{prefix_key, Field, Row, RowKind};
use crate::validate::Violation;
use edtui::{EditorState, Lines};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use thiserror::Error;

#[derive(PartialEq)]
/// Determines which screen renders and how input is interpreted.
pub enum View {
    /// The editable grid of rows and columns.
    Grid,
    /// Vim-like editor for the focused cell's value.
    Edit,
    /// Captures vim-style command input after ':' is pressed.
    Command,
    /// Awaiting confirmation of a chapter cascade delete.
    ConfirmDelete,
}

#[derive(Debug, Error, PartialEq, Eq)]
/// A structural operation was requested against an ineligible row.
///
/// Every variant leaves the sequence completely unchanged; the surface shows
/// the message in the status bar and the session continues. These are the
/// expected outcome of ordinary editing (asking to demote the first topic,
/// reordering against a chapter boundary), not exceptional states.
pub enum EditError {
    /// No row is focused.
    #[error("put the cursor on a row to perform this action")]
    NoFocus,
    /// Subtopic insertion needs a topic or subtopic reference row.
    #[error("select a topic or a row below it to insert a subtopic")]
    SubtopicNeedsTopic,
    /// Promote is only defined for depth-3 rows.
    #[error("only a subtopic can be promoted")]
    NotASubtopic,
    /// Demote is only defined for depth-2 rows.
    #[error("only a topic can be demoted")]
    NotATopic,
    /// The chapter's first topic has no predecessor to receive it.
    #[error("the first topic in a chapter cannot become a subtopic")]
    NoPreviousTopic,
    /// Reorder is only defined for topic-kind rows.
    #[error("only topic and subtopic rows can be reordered")]
    NotReorderable,
    /// The reorder neighbour belongs to a different chapter.
    #[error("reorder would cross a chapter boundary")]
    ChapterBoundary,
    /// The swap would leave a subtopic as the chapter's first child.
    #[error("reorder would make a subtopic the first item of the chapter")]
    SubtopicWouldLeadChapter,
    /// Deleting this topic would orphan its subtopics.
    #[error(
        "cannot delete the first topic: there is no previous topic to reparent its subtopics"
    )]
    NoReparentTarget,
    /// Chapter deletion cascades and must be confirmed first.
    #[error("deleting a chapter removes all of its topics and subtopics")]
    CascadeNeedsConfirm,
    /// The focused cell does not belong to the row's field set.
    #[error("this cell is not editable for this row")]
    CellNotEditable,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// Deferred full-sequence recomputation, drained in FIFO order.
///
/// Derived flags are intentionally not recomputed inline with the mutation
/// that invalidated them; mutations enqueue a task and the event loop drains
/// the queue at the top of the next tick. Tests call
/// [`AppState::flush_pending`] to settle state deterministically.
pub enum Task {
    /// Recompute every row's `has_children` flag.
    RecomputeChildren,
}

/// Bridges the row sequence and the interactive grid, maintaining session
/// state.
pub struct AppState {
    /// The authoritative row sequence in display/export order.
    pub rows: Vec<Row>,
    /// Focused row position in the sequence.
    pub cursor_row: usize,
    /// Focused column as an index into [`Field::ALL`].
    pub cursor_col: usize,
    /// Collapse keys of rows whose descendants are hidden. Transient UI
    /// state: cleared on load, never consulted by structural operations.
    pub collapsed: HashSet<String>,
    /// Active screen determining input handling.
    pub view: View,
    /// Editor buffer content while a cell edit is in progress.
    pub editor_state: Option<EditorState>,
    /// Accumulates vim-style command input after ':' is pressed.
    pub command_buffer: String,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// Where `:w` writes without an explicit path.
    pub document_path: Option<PathBuf>,
    /// Language fallbacks for new chapters.
    pub config: Config,
    pending: VecDeque<Task>,
}

fn first_col(kind: RowKind) -> usize {
    let first = Field::for_kind(kind)[0];
    Field::ALL
        .iter()
        .position(|field| *field == first)
        .unwrap_or(0)
}

impl AppState {
    #[must_use]
    /// Initialises an empty session with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            rows: Vec::new(),
            cursor_row: 0,
            cursor_col: 0,
            collapsed: HashSet::new(),
            view: View::Grid,
            editor_state: None,
            command_buffer: String::new(),
            message: None,
            document_path: None,
            config,
            pending: VecDeque::new(),
        }
    }

    /// Replace the whole sequence, e.g. after an import.
    ///
    /// Resets focus and the collapse set and schedules a child-flag
    /// recomputation.
    pub fn load_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.collapsed.clear();
        self.cursor_row = 0;
        self.cursor_col = self.rows.first().map_or(0, |row| first_col(row.kind));
        self.editor_state = None;
        self.view = View::Grid;
        self.schedule(Task::RecomputeChildren);
    }

    /// Reset to a fresh single-chapter document.
    pub fn new_document(&mut self) {
        let mut chapter = Row::blank_chapter(
            &self.config.primary_language,
            &self.config.secondary_language,
        );
        chapter.name = "New chapter".to_string();
        let topic = Row::blank_topic(&chapter.id);
        self.load_rows(vec![chapter, topic]);
    }

    // --- Focus ---

    #[must_use]
    /// The focused row, or `None` for an empty sequence.
    pub fn focused(&self) -> Option<&Row> {
        self.rows.get(self.cursor_row)
    }

    #[must_use]
    /// The field the cursor column currently addresses.
    pub fn focused_field(&self) -> Field {
        Field::ALL[self.cursor_col.min(Field::ALL.len() - 1)]
    }

    fn require_focus(&self) -> Result<usize, EditError> {
        if self.rows.is_empty() {
            Err(EditError::NoFocus)
        } else {
            Ok(self.cursor_row)
        }
    }

    /// Move focus to the row with the given id, landing on its first
    /// editable field. Unknown ids leave focus where it was.
    pub fn focus_row(&mut self, id: &str) {
        if let Some(index) = self.rows.iter().position(|row| row.id == id) {
            self.cursor_row = index;
            self.cursor_col = first_col(self.rows[index].kind);
        }
    }

    /// Park the cursor on a validation violation, expanding any collapsed
    /// ancestors so the cell is actually visible.
    pub fn focus_violation(&mut self, violation: &Violation) {
        let Some(row) = self.rows.get(violation.row_index) else {
            return;
        };
        let path = row.path.clone();
        for depth in 1..path.len() {
            self.collapsed.remove(&prefix_key(&path[..depth]));
        }
        self.cursor_row = violation.row_index;
        if let Some(col) = Field::ALL.iter().position(|field| *field == violation.field) {
            self.cursor_col = col;
        }
    }

    /// Step row focus through the visible sequence.
    pub fn focus_step(&mut self, dir: isize) {
        let visible = self.visible_indices();
        if visible.is_empty() {
            return;
        }
        let position = match visible.iter().position(|&i| i == self.cursor_row) {
            Some(position) => position.saturating_add_signed(dir).min(visible.len() - 1),
            // Focus is on a hidden row (collapse happened elsewhere); snap to
            // the nearest visible neighbour in the step direction.
            None => {
                let insertion = visible.partition_point(|&i| i < self.cursor_row);
                if dir < 0 {
                    insertion.saturating_sub(1)
                } else {
                    insertion.min(visible.len() - 1)
                }
            }
        };
        self.cursor_row = visible[position];
    }

    /// Step column focus left or right, clamped to the column range.
    pub fn col_step(&mut self, dir: isize) {
        self.cursor_col = self
            .cursor_col
            .saturating_add_signed(dir)
            .min(Field::ALL.len() - 1);
    }

    fn clamp_cursor(&mut self) {
        if self.cursor_row >= self.rows.len() {
            self.cursor_row = self.rows.len().saturating_sub(1);
        }
    }

    // --- Deferred recomputation ---

    /// Enqueue a deferred recomputation.
    pub fn schedule(&mut self, task: Task) {
        self.pending.push_back(task);
    }

    /// Drain the deferred-task queue in FIFO order.
    ///
    /// The event loop calls this at the top of every tick; tests call it
    /// directly before asserting derived state.
    pub fn flush_pending(&mut self) {
        while let Some(task) = self.pending.pop_front() {
            match task {
                Task::RecomputeChildren => self.recompute_children(),
            }
        }
    }

    fn recompute_children(&mut self) {
        let mut parents: HashSet<String> = HashSet::new();
        for row in &self.rows {
            if row.path.len() > 1 {
                parents.insert(prefix_key(&row.path[..row.path.len() - 1]));
            }
        }
        for row in &mut self.rows {
            row.has_children = parents.contains(&row.path_key());
        }
    }

    // --- Collapse ---

    #[must_use]
    /// Positions of the rows not hidden under a collapsed ancestor, in
    /// sequence order. This is a projection for the surface; the underlying
    /// sequence is never reordered or filtered by collapsing.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                !(1..row.path.len())
                    .any(|depth| self.collapsed.contains(&prefix_key(&row.path[..depth])))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Collapse or expand the focused row's descendants.
    pub fn toggle_collapsed(&mut self) {
        let Some(row) = self.focused() else { return };
        if !row.has_children {
            return;
        }
        let key = row.path_key();
        if !self.collapsed.remove(&key) {
            self.collapsed.insert(key);
        }
    }

    /// Collapse every parent row, or expand everything if anything is
    /// already collapsed.
    pub fn toggle_all_collapsed(&mut self) {
        if self.collapsed.is_empty() {
            self.collapsed = self
                .rows
                .iter()
                .filter(|row| row.has_children && row.depth() <= 2)
                .map(Row::path_key)
                .collect();
        } else {
            self.collapsed.clear();
        }
    }

    // --- Cell editing ---

    /// Open the focused cell in the editor buffer.
    ///
    /// # Errors
    ///
    /// Rejected when the column does not belong to the focused row's kind.
    pub fn begin_edit(&mut self) -> Result<(), EditError> {
        let index = self.require_focus()?;
        let field = self.focused_field();
        let row = &self.rows[index];
        if !row.editable(field) {
            return Err(EditError::CellNotEditable);
        }
        let value = row.get(field);
        let text = if value.is_empty() {
            "\n".to_string()
        } else {
            value.to_string()
        };
        self.editor_state = Some(EditorState::new(Lines::from(text.as_str())));
        self.view = View::Edit;
        Ok(())
    }

    /// Write the editor buffer back into the focused cell.
    pub fn save_edit(&mut self) {
        if let Some(ref editor_state) = self.editor_state {
            let lines: Vec<String> = editor_state
                .lines
                .iter_row()
                .map(|line| line.iter().collect::<String>())
                .collect();
            let value = lines.join("\n").trim().to_string();
            let field = self.focused_field();
            self.rows[self.cursor_row].set(field, value);
        }
    }

    /// Leave the cell editor, optionally persisting the buffer first.
    pub fn close_edit(&mut self, save: bool) {
        if save {
            self.save_edit();
        }
        self.editor_state = None;
        self.view = View::Grid;
    }

    // --- Insertion ---

    fn insert_and_edit(&mut self, row: Row, index: usize) -> Result<(), EditError> {
        let kind = row.kind;
        self.rows.insert(index, row);
        self.cursor_row = index;
        self.cursor_col = first_col(kind);
        self.schedule(Task::RecomputeChildren);
        self.begin_edit()
    }

    /// Insert a new chapter after the focused row (or at the top of an empty
    /// sequence), inheriting languages from a focused chapter row.
    ///
    /// # Errors
    ///
    /// Infallible in practice; shares the insertion error type.
    pub fn add_chapter(&mut self) -> Result<(), EditError> {
        let (primary, secondary) = match self.focused() {
            Some(row) if row.is_chapter() => (
                row.primary_language.clone(),
                row.secondary_language.clone(),
            ),
            _ => (
                self.config.primary_language.clone(),
                self.config.secondary_language.clone(),
            ),
        };
        let index = if self.rows.is_empty() {
            0
        } else {
            self.cursor_row + 1
        };
        self.insert_and_edit(Row::blank_chapter(&primary, &secondary), index)
    }

    /// Insert a new topic after the focused row, in the focused row's
    /// chapter.
    ///
    /// # Errors
    ///
    /// Rejected when nothing is focused.
    pub fn add_topic(&mut self) -> Result<(), EditError> {
        let index = self.require_focus()?;
        let chapter = self.rows[index].chapter_id().to_string();
        self.insert_and_edit(Row::blank_topic(&chapter), index + 1)
    }

    /// Insert a new subtopic after the focused row, under the focused row's
    /// topic.
    ///
    /// # Errors
    ///
    /// Rejected when nothing is focused or the focused row is a chapter,
    /// which has no topic to attach the subtopic to.
    pub fn add_subtopic(&mut self) -> Result<(), EditError> {
        let index = self.require_focus()?;
        let row = &self.rows[index];
        if row.depth() < 2 {
            return Err(EditError::SubtopicNeedsTopic);
        }
        let chapter = row.path[0].clone();
        let topic = row.path[1].clone();
        self.insert_and_edit(Row::blank_subtopic(&chapter, &topic), index + 1)
    }

    /// Insert a blank row of the focused row's kind and parentage above it.
    ///
    /// # Errors
    ///
    /// Rejected when nothing is focused.
    pub fn insert_above(&mut self) -> Result<(), EditError> {
        self.insert_relative(0)
    }

    /// Insert a blank row of the focused row's kind and parentage below it.
    ///
    /// # Errors
    ///
    /// Rejected when nothing is focused.
    pub fn insert_below(&mut self) -> Result<(), EditError> {
        self.insert_relative(1)
    }

    fn insert_relative(&mut self, offset: usize) -> Result<(), EditError> {
        let index = self.require_focus()?;
        let row = &self.rows[index];
        let blank = match row.depth() {
            1 => Row::blank_chapter(&row.primary_language, &row.secondary_language),
            2 => Row::blank_topic(row.chapter_id()),
            _ => Row::blank_subtopic(&row.path[0], &row.path[1]),
        };
        self.insert_and_edit(blank, index + offset)
    }

    // --- Reparenting ---

    /// Position of the closest preceding depth-2 topic in the same chapter,
    /// scanning the full sequence backwards and stopping at the chapter
    /// boundary (the first row whose chapter id differs).
    fn previous_topic(&self, from: usize, chapter: &str) -> Option<usize> {
        for index in (0..from).rev() {
            let row = &self.rows[index];
            if row.chapter_id() != chapter {
                break;
            }
            if row.is_topic() {
                return Some(index);
            }
        }
        None
    }

    /// Promote the focused subtopic to a topic of its chapter.
    ///
    /// The row's own id becomes its topic id; only `path` changes.
    ///
    /// # Errors
    ///
    /// Rejected for anything but a depth-3 topic-kind row.
    pub fn promote(&mut self) -> Result<(), EditError> {
        let index = self.require_focus()?;
        if !self.rows[index].is_subtopic() {
            return Err(EditError::NotASubtopic);
        }
        let row = &mut self.rows[index];
        row.path = vec![row.path[0].clone(), row.id.clone()];
        self.schedule(Task::RecomputeChildren);
        Ok(())
    }

    /// Demote the focused topic to a subtopic of the previous topic.
    ///
    /// # Errors
    ///
    /// Rejected for anything but a depth-2 row, and for the chapter's first
    /// topic, which has no predecessor to receive it.
    pub fn demote(&mut self) -> Result<(), EditError> {
        let index = self.require_focus()?;
        if !self.rows[index].is_topic() {
            return Err(EditError::NotATopic);
        }
        let chapter = self.rows[index].chapter_id().to_string();
        let target = self
            .previous_topic(index, &chapter)
            .ok_or(EditError::NoPreviousTopic)?;
        let target_id = self.rows[target].id.clone();
        let row = &mut self.rows[index];
        row.path = vec![chapter, target_id, row.id.clone()];
        self.schedule(Task::RecomputeChildren);
        Ok(())
    }

    // --- Reordering ---

    /// Swap the focused row with its predecessor.
    ///
    /// # Errors
    ///
    /// See [`AppState::reorder`] preconditions.
    pub fn move_row_up(&mut self) -> Result<(), EditError> {
        self.reorder(-1)
    }

    /// Swap the focused row with its successor.
    ///
    /// # Errors
    ///
    /// See [`AppState::reorder`] preconditions.
    pub fn move_row_down(&mut self) -> Result<(), EditError> {
        self.reorder(1)
    }

    /// Swap the focused topic-kind row with its sequence neighbour.
    ///
    /// The neighbour must belong to the same chapter, and the swap must not
    /// leave a subtopic as the first item under the chapter header. At the
    /// ends of the sequence there is no neighbour and the call is a no-op.
    ///
    /// # Errors
    ///
    /// Rejected for chapter rows, across chapter boundaries, and when the
    /// first-child guard trips.
    pub fn reorder(&mut self, dir: isize) -> Result<(), EditError> {
        let index = self.require_focus()?;
        let row = &self.rows[index];
        if row.kind != RowKind::Topic {
            return Err(EditError::NotReorderable);
        }
        let chapter = row.chapter_id().to_string();
        let Some(neighbour) = index
            .checked_add_signed(dir)
            .filter(|&n| n < self.rows.len())
        else {
            return Ok(());
        };
        let other = &self.rows[neighbour];
        if other.is_chapter() || other.chapter_id() != chapter {
            return Err(EditError::ChapterBoundary);
        }

        // The chapter header's position decides which slot is "first child".
        let header = (0..=index)
            .rev()
            .find(|&i| self.rows[i].is_chapter() && self.rows[i].chapter_id() == chapter);
        let first_child = header.map_or(0, |h| h + 1);
        if dir < 0 && neighbour == first_child && self.rows[index].is_subtopic() {
            return Err(EditError::SubtopicWouldLeadChapter);
        }
        if dir > 0 && index == first_child && self.rows[neighbour].is_subtopic() {
            return Err(EditError::SubtopicWouldLeadChapter);
        }

        self.rows.swap(index, neighbour);
        self.cursor_row = neighbour;
        self.schedule(Task::RecomputeChildren);
        Ok(())
    }

    // --- Deletion ---

    /// Delete the focused row under the depth-dependent policy.
    ///
    /// Chapters cascade over every row of the chapter and require
    /// `confirmed`; subtopics are removed alone; topics first reparent their
    /// subtopics to the previous topic and are rejected outright when none
    /// exists. The reparent scan reads the sequence as of operation start and
    /// the path rewrites land together with the removal.
    ///
    /// # Errors
    ///
    /// Rejected when nothing is focused, when a chapter delete is not yet
    /// confirmed, or when a topic has no reparent target. On rejection the
    /// sequence is unchanged.
    pub fn delete_focused(&mut self, confirmed: bool) -> Result<(), EditError> {
        let index = self.require_focus()?;
        match self.rows[index].depth() {
            1 => {
                if !confirmed {
                    return Err(EditError::CascadeNeedsConfirm);
                }
                let chapter = self.rows[index].chapter_id().to_string();
                self.rows.retain(|row| row.chapter_id() != chapter);
                self.clamp_cursor();
            }
            3 => {
                self.rows.remove(index);
                self.clamp_cursor();
            }
            _ => {
                let chapter = self.rows[index].chapter_id().to_string();
                let topic_id = self.rows[index].id.clone();
                let target = self
                    .previous_topic(index, &chapter)
                    .ok_or(EditError::NoReparentTarget)?;
                let target_id = self.rows[target].id.clone();
                for row in &mut self.rows {
                    if row.is_subtopic() && row.path[0] == chapter && row.path[1] == topic_id {
                        row.path = vec![chapter.clone(), target_id.clone(), row.id.clone()];
                    }
                }
                self.rows.remove(index);
                self.focus_row(&target_id);
            }
        }
        self.schedule(Task::RecomputeChildren);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
