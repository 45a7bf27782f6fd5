pub mod cli;
pub mod commands;
pub mod evaluation;
pub mod model;
pub mod store;
pub mod util;
