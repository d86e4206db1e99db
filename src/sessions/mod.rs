pub mod repo;
pub mod services;

pub use services::SESSION_COOKIE;
