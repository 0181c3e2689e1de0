pub mod commands;
pub mod cors;
pub mod driver;
pub mod server;
pub(crate) mod sim_ws;
