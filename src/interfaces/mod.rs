//! Presentation glue: turning user input into engine arguments and records
//! into text.

pub mod csv;
pub mod input;
pub mod summary;
