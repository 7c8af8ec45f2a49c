//! # cinebox
//!
//! Core of a movie-browsing client over the TMDB catalog API: a local-storage
//! backed session stand-in, a route guard gating navigation on that session,
//! a movie query builder plus thin HTTP client, and the small client-side
//! helpers (favorites, infinite scroll, debounce) the views consume.
//!
//! The `cinebox` binary drives all of it from the terminal; it plays the part
//! of the view layer, rendering notices and navigations as text.

pub mod api;
pub mod config;
pub mod context;
pub mod debounce;
pub mod favorites;
pub mod pager;
pub mod router;
pub mod session;
pub mod storage;
pub mod ui;
