//! CLI command handlers. Each command is in its own file.

mod collect;
mod completions;
mod download;

pub use collect::run_collect;
pub use completions::{run_completions, run_man};
pub use download::{run_download, DownloadArgs};
