pub mod layers;
pub mod opt;
pub mod server;
