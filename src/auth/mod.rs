pub mod middleware;

pub use middleware::{provided_passkey, RequirePasskey};
