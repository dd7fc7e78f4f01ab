// Authentication module
// Validates JWT sessions issued by the external auth service; this API
// performs no registration, login, or password handling of its own.

pub mod error;
pub mod middleware;
pub mod models;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::AuthenticatedUser;
pub use models::{Role, UserProfile};
pub use token::{Claims, TokenService};
