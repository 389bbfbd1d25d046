pub mod auth;
pub mod context;

pub use auth::authenticate;
pub use context::RequestContext;
