mod auth;
mod connection;

pub use auth::TokenManager;
pub use connection::ConnectionManager;
