#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
pub mod acquire;
pub mod configs;
pub mod downloads;
pub mod instance;
pub mod mods;

pub mod fs;

pub mod consts;

pub use consts::*;

pub use reach_modding;
