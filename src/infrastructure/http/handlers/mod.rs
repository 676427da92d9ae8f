//! HTTP Handlers

mod download;
mod ping;
mod speech;

pub use download::*;
pub use ping::*;
pub use speech::*;
