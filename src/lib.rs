// Library for tests to access modules

pub mod cli;
pub mod config;
pub mod docker_client;
pub mod models;
pub mod monitor;
pub mod render;
pub mod version;
pub mod worker;
