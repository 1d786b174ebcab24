//! CLI command implementations.

mod chat;
mod config;
mod db;
mod doctor;
mod init;
mod run;

pub use chat::run_chat;
pub use config::run_config;
pub use db::run_db;
pub use doctor::run_doctor;
pub use init::run_init;
pub use run::run_task;
