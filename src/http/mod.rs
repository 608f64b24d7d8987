//! Contains the HTTP vocabulary types used by dispatch.

mod method;
pub use method::*;

mod mime;
pub use mime::*;

mod metadata;
pub use metadata::*;

mod request;
pub use request::*;

mod response;
pub use response::*;

mod status;
pub use status::*;
