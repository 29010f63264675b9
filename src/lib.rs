//! # service_locator
//!
//! A minimal, thread-safe service locator for Rust.
//!
//! A [`Registry`] associates a type with one of three provisioning strategies
//! and hands back a correctly typed `Arc<T>` on request:
//!
//! - **Singleton**: a pre-built value, returned as-is on every retrieval.
//! - **Lazy singleton**: built on first retrieval, exactly once, then cached.
//! - **Factory**: built fresh on every retrieval.
//!
//! Retrieval is keyed by the type the caller names at the call site, which
//! may be a trait object, so consumers can depend on an abstraction while
//! the registering side picks the implementation.
//!
//! ## Core Concepts
//!
//! - **Registry**: the container holding all registrations. There is no
//!   ambient global instance; construct a `Registry` and pass it explicitly.
//! - **Resolution**: [`Registry::get`] (or the [`resolve!`] macro) returns a
//!   `Result`; a missing registration is an ordinary error value, never a
//!   panic.
//! - **Traits**: services can be registered against a trait and resolved as a
//!   trait object.
//!
//! ## Quick Start
//!
//! ```
//! use service_locator::{resolve, Registry};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!   fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter {
//!   message: String,
//! }
//!
//! impl Greeter for EnglishGreeter {
//!   fn greet(&self) -> String {
//!     self.message.clone()
//!   }
//! }
//!
//! let registry = Registry::new();
//!
//! // A pre-built value.
//! registry.register_singleton(String::from("Hello, World!"));
//!
//! // A trait-keyed service, built on first use.
//! registry.register_lazy_singleton_trait::<dyn Greeter, _>(|| {
//!   Arc::new(EnglishGreeter {
//!     message: String::from("Hello, World!"),
//!   })
//! });
//!
//! let greeter = resolve!(registry, trait Greeter).unwrap();
//! assert_eq!(greeter.greet(), "Hello, World!");
//! ```

mod core;
mod error;
mod macros;
mod registry;

pub use error::{Error, Result};
pub use registry::Registry;
