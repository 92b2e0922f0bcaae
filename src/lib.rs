pub mod actions;
pub mod client;
pub mod notify;
pub mod poller;
pub mod render;
pub mod series;
pub mod term;
pub mod types;

pub use client::{StatusClient, StatusSource};
pub use poller::{Dashboard, Poller};
