//! Document formats consumed and produced by the grid.
//!
//! `collection` is the nested `chapter_collection` JSON document the row
//! sequence round-trips through losslessly; `table` is the one-way CSV
//! projection for spreadsheet tools. Both operate on the flat row sequence
//! and never touch editor state.

pub mod collection;
pub mod table;
