//! # Savegame
//!
//! Decodes X4 savegames into typed data. A savegame stores its script values
//! in integer-indexed reference tables rather than inline; this crate streams
//! the XML once, rebuilds those tables, and then materializes the combat
//! event log they carry.
//!
//! ## Pipeline
//!
//! - **decoder**: state machine over open/close tag events, filling a [`ReferenceStore`]
//! - **refs**: the reference tables and the [`TypedValue`] variants they hold
//! - **materializer**: turns the event log list into [`CombatEvent`]s
//!
//! Fatal problems (I/O, broken markup) surface as [`DecodeError`]. Anything
//! local to one element or field is skipped and reported as a [`Diagnostic`].

pub mod config;
pub mod decoder;
pub mod diagnostics;
pub mod entities;
pub mod error;
pub mod materializer;
pub mod refs;

pub use config::*;
pub use decoder::*;
pub use diagnostics::*;
pub use entities::*;
pub use error::*;
pub use materializer::{EventMaterializer, KeyIndex, Materialized};
pub use refs::*;
