//! Tern is the request dispatch core for resource oriented servers: a uri
//! template router with typed variable extraction, quality factor weighted
//! content negotiation across four dimensions, and a per resource dispatch
//! state machine for conditional (ETag/date) request handling. It contains
//! no wire code, a connector parses requests into the structured form and
//! serializes the responses this crate produces.

#![warn(missing_docs)]

pub mod http;

pub mod client;
pub mod conditions;
pub mod conneg;
pub mod redirect;
pub mod resource;
pub mod route;
pub mod router;
pub mod template;
pub mod tern_error;
mod util;

pub use http::{Method, Request, Response, StatusCode};
pub use http::{MediaRange, MimeGroup, MimeType, QValue};
pub use tern_error::{TemplateError, TernError, TernResult};
