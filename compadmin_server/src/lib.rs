pub mod component;
pub mod config;
pub mod demo;
pub mod dispatch;
pub mod params;
pub mod registry;
pub mod render;
pub mod resources;
pub mod server;

#[cfg(test)]
mod tests;

pub use component::{Component, EventSet, Property};
pub use config::{AdminConfig, ConfigError};
pub use registry::{FromArg, MethodId, Registry};
pub use server::Server;
