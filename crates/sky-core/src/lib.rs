#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod constants;
pub mod errors;
pub mod models;
pub mod services;
pub mod workflows;

pub use crate::constants::*;
pub use crate::errors::*;
pub use crate::models::*;
pub use crate::services::*;
pub use crate::workflows::*;
