//! TMDB catalog access.
//!
//! DESIGN
//! ======
//! [`query`] builds request descriptors as pure values; [`client`] sends them.
//! The credential is never stored in the client: every call receives it as an
//! explicit [`Credential`] argument, so a credential change can only affect
//! requests prepared after it.

pub mod client;
pub mod credential;
pub mod query;
pub mod types;

pub use client::{ApiClient, ApiError, CredentialValidator};
pub use credential::Credential;
pub use query::{Category, MovieFilter, RequestDescriptor};
pub use types::{Genre, Movie, MoviePage};
