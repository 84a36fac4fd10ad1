//! Macroconv Core - input macro conversion engine
//!
//! Loads click-bot macro files in one format, optionally edits the action
//! list, and writes them back out in another. The engine never touches the
//! filesystem: it maps bytes to a [`Macro`] and a [`Macro`] to a [`Payload`].
//!
//! # Architecture
//!
//! - [`ByteCursor`] - Bounds-checked little-endian reader/writer
//! - [`MacroFormat`] - Closed set of formats, each backed by a static codec
//! - [`detect()`] - Format guess from file name and header bytes
//! - [`transform`] - In-place edits (offset, flips, filtering, cleanup)
//! - [`pipeline`] - Load, transform and export in one call
//! - [`config`] - User defaults stored as TOML

pub mod config;
pub mod cursor;
pub mod detect;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod transform;
pub mod types;

pub use cursor::{ByteCursor, CursorError};
pub use detect::{Detection, detect};
pub use error::{ConvertError, FormatError, Result};
pub use format::{DecodeOptions, MacroFormat, Payload, UnitSupport, UnknownFormat};
pub use pipeline::{
    ConversionOutput, ConversionRequest, LoadedMacro, convert, export, load, output_file_name,
};
pub use transform::{Transform, TransformReport};
pub use types::{Action, Macro, Player};
