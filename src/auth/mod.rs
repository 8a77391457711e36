pub mod middleware;

pub use middleware::{auth_middleware, require_admin, AuthUser};
