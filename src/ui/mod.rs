// UI module for the FINISH site host
// egui views over the library controllers

pub mod rich_text;
pub mod types;
pub mod views;

pub use types::{RemoteEvent, PARTNER_INTERESTS};
