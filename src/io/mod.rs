//! Boundary adapters: decoding source tables and writing report workbooks.

pub mod excel_write;
pub mod table_read;
