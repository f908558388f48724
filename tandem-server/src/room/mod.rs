mod handshake_cache;
mod room;
mod room_manager;

pub use handshake_cache::*;
pub use room::*;
pub use room_manager::*;
