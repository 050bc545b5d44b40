mod auth;
mod newsletters;

pub use auth::*;
pub use newsletters::*;
