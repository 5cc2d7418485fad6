pub mod health;
pub mod translate;

pub use health::{health_check, ping, AppState};
pub use translate::{create_router as create_translate_router, TranslateState};
