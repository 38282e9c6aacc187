//! Core library for the gradebook-transfer command line application.
//!
//! A gradebook or attendance export is decoded into a [`model::Dataset`]
//! by [`io::table_read`], its columns are grouped by [`classify`], every
//! student row is scored through [`score`] and [`aggregate`], and
//! [`layout`] describes one styled sheet per student. Sheet titles come from
//! [`naming`]; [`io::excel_write`] renders the result. The [`transfer`]
//! module ties these steps together for the CLI and the integration tests.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod dates;
pub mod error;
pub mod io;
pub mod layout;
pub mod model;
pub mod naming;
pub mod score;
pub mod transfer;

pub use error::{Result, ToolError};
