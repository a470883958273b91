/// Middleware module
///
/// Session authentication for everything outside the public paths.

mod session_middleware;

pub use session_middleware::{AuthenticatedUser, SessionMiddleware};
