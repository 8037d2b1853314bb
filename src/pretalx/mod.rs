mod client;
mod models;

pub use client::*;
pub use models::*;

#[cfg(test)]
pub(crate) use client::tests as fixtures;
