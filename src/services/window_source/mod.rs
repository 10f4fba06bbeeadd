//! Window sources: where compositor state comes from.
//!
//! A source only mirrors what the compositor reports as [`SourceEvent`]s.
//! It MUST NOT decide what gets published; that belongs to the monitor,
//! which sees the compositor through [`WindowTable`].

mod dry_run;
mod niri;
mod r#trait;
mod window_table;

pub use self::r#trait::create_window_source;
pub use self::window_table::WindowTable;
