mod app;
pub mod components;
pub(crate) mod key_handler;
pub mod layout;
mod once;

pub use app::App;
pub use once::render_once;
