mod actions;
pub(crate) mod args;
pub(crate) mod credentials;
pub(crate) mod entities;
pub(crate) mod http;
pub(crate) mod types;

pub(crate) use actions::{handle_deidentify, handle_insert, handle_reidentify};
