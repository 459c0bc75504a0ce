pub mod app;
pub mod components;
pub mod format;
pub mod state;

pub use app::GuestbookApp;
pub use state::GuestbookState;
