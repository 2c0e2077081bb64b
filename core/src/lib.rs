//! Typed client for the todo server. It never does I/O itself: every call
//! is a `build_*` that returns an [`HttpRequest`] and a `parse_*` that takes
//! the matching [`HttpResponse`].

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, Todo, UpdateTodo};
