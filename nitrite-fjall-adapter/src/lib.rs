extern crate core;

mod config;
mod map;
mod module;
mod store;
mod version;
mod wrapper;

pub use config::*;
pub use module::*;
