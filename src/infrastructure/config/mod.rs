//! Configuration storage adapters

mod xdg;

pub use xdg::{default_output_path, XdgConfigStore};
