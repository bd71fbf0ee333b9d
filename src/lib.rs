pub mod attendance;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod guard;
pub mod listview;
pub mod notify;
pub mod report;
pub mod request;
pub mod resources;
