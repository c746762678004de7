//! # django-core-auth
//!
//! A persisted [`User`] model, argon2 password hashing and the
//! [`EmailOrUsernameBackend`], which logs users in by either identifier.
//!
//! Hashing runs on `tokio::task::spawn_blocking` so it never stalls the
//! async runtime.

pub mod backends;
pub mod hashers;
pub mod user;

pub use backends::{AuthBackend, EmailOrUsernameBackend};
pub use hashers::{check_password, is_password_usable, make_password};
pub use user::{User, UserStore};
