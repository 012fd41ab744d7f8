pub mod counter_store;
pub mod database;
pub mod image_generator;
pub mod metrics;
pub mod providers;

pub use counter_store::{CounterStore, InMemoryCounterStore};
pub use database::CounterDb;
pub use image_generator::{ImageError, ImageGenerator};
