pub mod assets;
pub mod gui;
pub mod keyboard_hook;
pub mod keys;
pub mod logging;
pub mod overlay;
pub mod settings;
pub mod settings_store;
