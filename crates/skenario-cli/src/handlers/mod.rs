//! Command handlers, kept out of main.rs so they can be tested directly

pub mod config;
pub mod init;
pub mod list;

pub use config::{execute_config, render_config};
pub use init::{execute_init, init_files, CONFIG_TEMPLATE, LOGIN_SCENARIO_TEMPLATE};
pub use list::{execute_list, execute_validate, render_listing, validation_summary};
