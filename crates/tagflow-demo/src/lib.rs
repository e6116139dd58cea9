#![forbid(unsafe_code)]

//! Library half of the tagflow demo so the app model and CLI parsing can
//! be tested without a terminal.

pub mod app;
pub mod cli;
pub mod error;
pub mod logging;
pub mod sample;
