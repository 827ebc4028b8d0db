//! Loading point positions for pointpick
//!
//! Position assets are supplied once at startup as a flat float sequence.
//! This crate reads them from JSON or delimited text files and can also
//! generate a synthetic planet when no asset is at hand.

pub mod error;
pub mod positions;
pub mod synthetic;

pub use error::*;
pub use positions::{load_dataset, parse_positions_json, parse_positions_text, read_positions, PositionFormat};
pub use synthetic::planet_shell;
