//! gostfmt CLI - Command-line interface library
//!
//! Reformats a `.docx` report, or builds one from `.txt` markup, following
//! the GOST academic style guide.
//!
//! # Library Usage
//!
//! ```ignore
//! use gostfmt_cli::{convert_command, ReformatOptions};
//!
//! convert_command(&input, &output, false, None, ReformatOptions::default())?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Reformat a report
//! gostfmt report.docx --output report-gost.docx
//!
//! # Build a report from markup, overwriting an earlier result
//! gostfmt notes.txt -o notes.docx --force
//!
//! # Show how each paragraph is classified
//! gostfmt report.docx --outline
//! ```

pub mod app;

// Re-export main entry point and commands
pub use app::{
    convert_command, load_settings, outline_command, outline_entries, run, run_cli, Cli,
};
pub use gostfmt_core::ReformatOptions;
