//! Output encoders (terminal).

mod ansi;

pub use ansi::AnsiEncoder;
