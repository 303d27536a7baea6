pub mod event;
pub mod host;
pub mod scores;
pub mod session;
