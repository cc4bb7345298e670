mod connection;
mod vault;

pub use connection::*;
pub use vault::*;
