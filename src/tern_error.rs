//! The crate wide error type and result alias.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io;
use std::io::ErrorKind;

/// Result alias used throughout the crate.
pub type TernResult<T> = Result<T, TernError>;

/// Errors raised while compiling a uri template pattern.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum TemplateError {
  /// The pattern contains a `{` without `}`, a stray `}` or nested braces.
  UnbalancedBraces(String),
  /// The same variable name appears twice in the pattern.
  DuplicateVariable(String, String),
  /// The pattern contains `{}` without a variable name.
  EmptyVariableName(String),
  /// A custom variable regex failed to parse.
  RegexSyntaxError(String, String, String),
  /// A custom variable regex exceeded the compiled size limit.
  RegexTooBig(String, String, usize),
}

impl Display for TemplateError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      TemplateError::UnbalancedBraces(pattern) => {
        write!(f, "unbalanced braces in template '{pattern}'")
      }
      TemplateError::DuplicateVariable(pattern, name) => {
        write!(f, "duplicate variable '{name}' in template '{pattern}'")
      }
      TemplateError::EmptyVariableName(pattern) => {
        write!(f, "empty variable name in template '{pattern}'")
      }
      TemplateError::RegexSyntaxError(pattern, regex, cause) => {
        write!(f, "invalid regex '{regex}' in template '{pattern}': {cause}")
      }
      TemplateError::RegexTooBig(pattern, regex, limit) => {
        write!(f, "regex '{regex}' in template '{pattern}' exceeds the compiled size limit {limit}")
      }
    }
  }
}
impl Error for TemplateError {}

/// The crate wide error enum.
#[derive(Debug)]
#[non_exhaustive]
pub enum TernError {
  /// A template pattern failed to compile.
  Template(TemplateError),
  /// An io error, e.g. raised by a connector behind a client caller.
  IO(io::Error),
  /// Anything a handler or resource method may raise.
  Other(Box<dyn Error + Send + Sync>),
}

impl TernError {
  /// Creates an io flavored error from a kind and a message.
  pub fn new_io<E: Into<Box<dyn Error + Send + Sync>>>(kind: ErrorKind, message: E) -> TernError {
    io::Error::new(kind, message).into()
  }

  /// Creates an io flavored error from a bare kind.
  pub fn from_io_kind(kind: ErrorKind) -> TernError {
    io::Error::from(kind).into()
  }

  /// The closest io error kind.
  pub fn kind(&self) -> ErrorKind {
    match self {
      TernError::IO(io) => io.kind(),
      TernError::Template(_) => ErrorKind::InvalidInput,
      TernError::Other(_) => ErrorKind::Other,
    }
  }

  /// Attempts to view the underlying error as a `T`.
  pub fn downcast_ref<T: Error + Send + 'static>(&self) -> Option<&T> {
    match self {
      TernError::IO(err) => (err as &dyn Error).downcast_ref::<T>(),
      TernError::Template(err) => (err as &dyn Error).downcast_ref::<T>(),
      TernError::Other(other) => other.downcast_ref::<T>(),
    }
  }

  /// Unwraps into the underlying boxed error.
  pub fn into_inner(self) -> Box<dyn Error + Send + Sync + 'static> {
    match self {
      TernError::IO(err) => Box::new(err) as Box<dyn Error + Send + Sync>,
      TernError::Template(err) => Box::new(err) as Box<dyn Error + Send + Sync>,
      TernError::Other(other) => other,
    }
  }
}

impl Display for TernError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      TernError::IO(err) => Display::fmt(err, f),
      TernError::Template(err) => Display::fmt(err, f),
      TernError::Other(err) => Display::fmt(err, f),
    }
  }
}

impl<T> From<T> for TernError
where
  T: Error + Send + Sync + 'static,
{
  fn from(value: T) -> Self {
    let mut dyn_box = Box::new(value) as Box<dyn Error + Send + Sync>;
    dyn_box = match dyn_box.downcast::<io::Error>() {
      Ok(err) => return TernError::IO(*err),
      Err(err) => err,
    };
    dyn_box = match dyn_box.downcast::<TemplateError>() {
      Ok(err) => return TernError::Template(*err),
      Err(err) => err,
    };

    TernError::Other(dyn_box)
  }
}

impl<T> From<TemplateError> for TernResult<T> {
  fn from(value: TemplateError) -> Self {
    Err(TernError::Template(value))
  }
}

impl From<TernError> for Box<dyn Error + Send> {
  fn from(value: TernError) -> Self {
    value.into_inner()
  }
}

impl From<TernError> for io::Error {
  fn from(value: TernError) -> Self {
    match value {
      TernError::IO(io) => io,
      err => io::Error::new(err.kind(), err.into_inner()),
    }
  }
}
