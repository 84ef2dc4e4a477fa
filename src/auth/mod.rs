//! Authentication: login credentials, JWT sessions, revocation.

pub mod middleware;
pub mod password;
pub mod service;

pub use service::{AuthResponse, AuthService, Claims, LoginRequest, RegisterRequest, UserProfile};
