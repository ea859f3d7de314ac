//! External collaborators of the `SafeSpeak` dashboard
//!
//! The dashboard reads whole collections from a document store and delegates
//! sign-in to an identity provider. Both are reached through the traits in
//! this crate so the server can be wired with the hosted Firebase services or
//! with the in-process implementations used for local runs and tests.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod auth;
pub mod error;
pub mod firestore;
pub mod identity;
pub mod memory;
pub mod store;

pub use auth::{AuthProvider, AuthSession, Identity};
pub use error::{BackendError, BackendResult};
pub use firestore::FirestoreClient;
pub use identity::IdentityToolkitClient;
pub use memory::{MemoryAuthProvider, MemoryStore};
pub use store::DocumentStore;
