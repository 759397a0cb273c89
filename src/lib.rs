// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
pub mod engine;
pub mod game;
pub mod level;
pub mod sprite;

#[cfg(test)]
mod testing;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs the panic hook
/// - hands the game to the loop, which loads assets then starts ticking
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        let game = game::Platformer::new();
        if let Err(err) = engine::GameLoop::start(game).await {
            error!("Could not start game loop : {:#?}", err);
        }
    });

    Ok(())
}
