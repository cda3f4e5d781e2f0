//! Collects a Python module together with every project file it imports.
//!
//! Starting from an entry file or dotted module name, this crate finds the
//! project root, follows imports that resolve inside it, and renders the
//! resulting files as one text blob (or JSON document) ready for the clipboard.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use copymod_closure::{Config, Format, SystemClipboard, deliver, run_copy};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config {
//!     target: "app.main".to_string(),
//!     root: None,
//!     search_roots: vec![],
//!     stdout: false,
//!     format: Format::Text,
//!     entry: None,
//! };
//!
//! let result = run_copy(cfg)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! deliver(&result.rendered.output, &SystemClipboard, false, &mut stdout)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod checker;
mod config;
mod graph;
mod reporter;
mod sink;
mod types;

// Re-export public API
pub use checker::run_copy;
pub use config::Config;
pub use graph::{Traversal, build_closure, build_closure_with};
pub use reporter::{collect_blocks, print_summary, relative_display, render, render_json, render_text};
pub use sink::{Clipboard, Delivered, SystemClipboard, deliver};
pub use types::{CopyResult, FileBlock, Format, Rendered, SkippedFile};
