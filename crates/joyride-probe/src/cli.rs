//! Command-line surface of `bundle-load-check`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::probe::{DEFAULT_MOCK_SOURCE, DEFAULT_RUNS, ProbeRequest};

/// Reports the size of the joyride.js bundle and how long it takes to load.
#[derive(Parser, Debug)]
#[command(name = "bundle-load-check", version)]
pub(crate) struct Cli {
    /// Extension directory containing `out/joyride.js`.
    #[arg(value_name = "EXTENSION_DIR")]
    pub(crate) extension_dir: PathBuf,
    /// Number of timed cold loads after the warm-up.
    #[arg(value_name = "RUNS", default_value_t = DEFAULT_RUNS)]
    pub(crate) runs: u32,
    /// Mock host-API package staged as `out/node_modules`.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_MOCK_SOURCE)]
    pub(crate) mock_dir: PathBuf,
    /// Node.js executable used for each load.
    #[arg(long, value_name = "PROGRAM", default_value = "node")]
    pub(crate) node: OsString,
}

impl Cli {
    pub(crate) fn request(&self) -> ProbeRequest {
        ProbeRequest {
            extension_dir: self.extension_dir.clone(),
            runs: self.runs,
            mock_source: self.mock_dir.clone(),
        }
    }
}
