//! Domain models for the cloudrun service.

pub mod counter;
pub mod image;

pub use counter::{Counter, CounterAction, COUNTER_ID};
pub use image::{ImageOutput, InputImage, ResponsePart};
