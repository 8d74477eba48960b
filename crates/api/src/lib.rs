//! Transaction service: composition root, RPC server, routing and DTO mapping.

pub mod app;
pub mod bootstrap;
pub mod server;
