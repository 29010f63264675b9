//! Public macros for ergonomic service retrieval.

/// Resolves a service from a registry.
///
/// Expands to [`Registry::get`](crate::Registry::get) and returns its
/// `Result` unchanged; the `trait` arm spares the caller the `dyn` turbofish
/// when resolving a trait-object service.
///
/// # Examples
///
/// ```
/// use service_locator::{resolve, Registry};
///
/// let registry = Registry::new();
/// registry.register_singleton(42_u32);
///
/// let answer = resolve!(registry, u32).unwrap();
/// assert_eq!(*answer, 42);
/// ```
///
/// ```
/// use service_locator::{resolve, Registry};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///   fn greet(&self) -> String;
/// }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter {
///   fn greet(&self) -> String {
///     "Hello!".to_string()
///   }
/// }
///
/// let registry = Registry::new();
/// registry.register_singleton_trait::<dyn Greeter>(Arc::new(EnglishGreeter));
///
/// let greeter = resolve!(registry, trait Greeter).unwrap();
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for resolving a concrete type: resolve!(registry, MyService)
  ($registry:expr, $type:ty) => {
    $registry.get::<$type>()
  };

  // Arm for resolving a trait object: resolve!(registry, trait MyTrait)
  ($registry:expr, trait $trait_ident:ident) => {
    $registry.get::<dyn $trait_ident>()
  };
}
