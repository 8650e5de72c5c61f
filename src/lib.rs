// Library surface for the binary and for headless/integration tests.
// Terminal setup and argument parsing stay in main.rs.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod progress;
pub mod question;
pub mod runtime;
pub mod selection;
pub mod session;
pub mod storage;
pub mod ui;
pub mod util;
