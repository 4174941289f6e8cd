pub mod config_cmd;
pub mod due;
pub mod edit;
pub mod init;
pub mod item;
pub mod list;
pub mod new;
pub mod remove;
pub mod show;
pub mod tags;
