mod adapter;
mod args;
mod broadcast;
mod consume;
mod context;
mod controller;
mod error;
mod flag_value;
mod flags;
mod memory_adapter;
mod provider;
mod render;
mod test_common;
mod toggle;

pub use adapter::*;
pub use args::*;
pub use broadcast::*;
pub use consume::*;
pub use context::*;
pub use controller::*;
pub use error::*;
pub use flag_value::*;
pub use flags::*;
pub use memory_adapter::*;
pub use provider::*;
pub use render::*;
pub use toggle::*;

use lazy_static::lazy_static;

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

lazy_static! {
    static ref PARSED_VERSION: semver::Version =
        semver::Version::parse(VERSION).expect("crate version is valid semver");
}

/// The version of this crate, parsed.
pub fn version() -> &'static semver::Version {
    &PARSED_VERSION
}
