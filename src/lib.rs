use wasm_bindgen::prelude::*;

#[macro_use]
pub mod macros;

pub mod bindings;
pub mod command_executors;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod navigation;
pub mod network;
pub mod reducers;
pub mod schema_validation;
pub mod settings;
pub mod state;
pub mod storage;
pub mod toast;
pub mod tool_calls;
pub mod ui_state;
pub mod update;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;

use messages::{Bootstrap, Message};
use network::config::window_origin;
use network::EnvDefaults;

// Main entry point for the WASM application
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Initialize better panic messages
    console_error_panic_hook::set_once();

    // Everything the page and the build know at startup; the reducers take
    // it from here.
    let boot = Bootstrap {
        navigation: navigation::read_location(),
        origin: window_origin(),
        env: EnvDefaults::from_build_env(),
        stored_api_key: storage::load_api_key(),
        stored_settings: storage::load_user_settings_raw(),
    };
    debug_log!("Starting with {:?}", boot.navigation);
    state::dispatch_global_message(Message::Init(Box::new(boot)));

    Ok(())
}
