#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]

pub mod common;
pub mod config;
pub mod database;
pub mod loader;
pub mod observer;
pub mod schema;
pub mod value;
pub mod verify;
