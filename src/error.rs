//! Error types for service retrieval.

use thiserror::Error;

/// Convenience alias for fallible locator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure modes of [`Registry::get`](crate::Registry::get).
///
/// Registration never fails; both variants can only come out of retrieval,
/// and both carry the name of the requested type for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// Neither an instance nor a provider is registered for the requested type.
  #[error("no provider registered for type `{type_name}`")]
  NoProviderRegistered {
    /// Name of the type the caller asked for.
    type_name: &'static str,
  },

  /// The requested type was registered as a lazy singleton placeholder,
  /// without a constructor.
  #[error("no constructor registered for lazy singleton of type `{type_name}`")]
  NoConstructorRegistered {
    /// Name of the type the caller asked for.
    type_name: &'static str,
  },
}

impl Error {
  /// The name of the type whose retrieval failed.
  pub fn type_name(&self) -> &'static str {
    match self {
      Error::NoProviderRegistered { type_name } => type_name,
      Error::NoConstructorRegistered { type_name } => type_name,
    }
  }
}
