pub mod keys;
pub mod panel;

pub use keys::intent_for_key;
pub use panel::render;
