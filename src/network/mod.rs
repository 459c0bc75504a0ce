pub mod api;
pub mod client;
pub mod http;
pub mod server;

pub use api::GuestbookApi;
pub use client::GuestbookClient;
pub use http::HttpApi;
