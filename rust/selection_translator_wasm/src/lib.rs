mod cache;
pub mod config;
pub mod controller;
pub mod error;
mod google;
pub mod host;
pub mod preferences;
pub mod selection;
pub mod speech;
pub mod tooltip;
pub mod translator;
mod utils;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
mod web;

use wasm_bindgen::prelude::*;

pub use config::Settings;
pub use controller::SelectionTranslator;
pub use error::TranslateError;

#[wasm_bindgen]
pub fn translator_api_version() -> u32 {
    1
}
