//! Schema-driven forms and generic data tables for ratatui back-office TUIs.
//!
//! The crate has two engines that nearly every back-office page is built on:
//!
//! - [`form`] - a declarative form renderer: a [`form::FormSchema`] describes
//!   named fields with a metadata bag; the renderer lays matching input
//!   controls out in a 12-unit grid, all bound to one [`form::FormState`].
//! - [`table`] - a generic data table: a column descriptor list plus a row
//!   collection become a sorted, paginated, selectable grid with slot-based
//!   cell overrides.
//!
//! Pages own the state containers and receive edits/selections back as
//! events through the [`ui::Component`] contract.

pub mod form;
pub mod keymap;
pub mod slot;
pub mod table;
pub mod theme;
pub mod tui;
pub mod ui;

pub use theme::Theme;
