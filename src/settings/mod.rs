//! Settings are read from `settings/dev.toml` or `settings/release.toml` unless a path
//! is given with `--settings`. See `bin/settings_demo.rs`.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
