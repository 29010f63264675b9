//! The [`Registry`] and its registration and retrieval methods.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::core::{ErasedCtor, ErasedInstance, LazyService, ProviderEntry, ServiceKey, SharedFactory};
use crate::error::{Error, Result};

/// A thread-safe, type-keyed service locator.
///
/// A `Registry` associates a type with one of three provisioning strategies
/// and hands back a correctly typed `Arc<T>` on [`get`]:
///
/// - **Singleton**: a pre-built value, returned identically on every
///   retrieval.
/// - **Lazy singleton**: built by its constructor on first retrieval only,
///   then cached and reused. The constructor runs exactly once even under
///   concurrent first access.
/// - **Factory**: its constructor runs on every retrieval; nothing is cached.
///
/// Values come back as `Arc<T>`, so a singleton keeps its identity across
/// retrievals and interior mutation through one handle is visible through all
/// of them. Dropping the registry drops every cached singleton.
///
/// Registering a type that is already registered silently replaces the prior
/// registration, whatever its strategy; the last registration wins. Note that
/// this can mask duplicate-registration bugs.
///
/// There is no process-global registry: construct one and pass it around.
///
/// ```
/// use service_locator::Registry;
///
/// let registry = Registry::new();
/// registry.register_singleton(String::from("hello"));
///
/// let greeting = registry.get::<String>().unwrap();
/// assert_eq!(*greeting, "hello");
/// ```
///
/// [`get`]: Registry::get
#[derive(Default)]
pub struct Registry {
  state: RwLock<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
  instances: HashMap<ServiceKey, ErasedInstance>,
  providers: HashMap<ServiceKey, ProviderEntry>,
}

/// A provider cloned out of the lock, so that user constructors never run
/// while the registry is locked.
enum Snapshot {
  Lazy(Arc<LazyService>),
  Factory(SharedFactory),
  Missing,
}

impl Registry {
  /// Creates a new, empty `Registry`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- Singleton Registration ---

  /// Registers `instance` as the singleton for `T`. Every subsequent
  /// [`get::<T>()`](Registry::get) returns the same `Arc`.
  pub fn register_singleton<T: Any + Send + Sync>(&self, instance: T) {
    self.put_instance(ServiceKey::of::<T>(), Box::new(Arc::new(instance)));
  }

  /// Registers an already shared value as the singleton for `I`, which may be
  /// a trait object. The key is derived from `I` as named by the caller,
  /// never from the concrete type behind it.
  ///
  /// ```
  /// use service_locator::Registry;
  /// use std::sync::Arc;
  ///
  /// trait Clock: Send + Sync {
  ///   fn now(&self) -> u64;
  /// }
  /// struct FixedClock;
  /// impl Clock for FixedClock {
  ///   fn now(&self) -> u64 {
  ///     0
  ///   }
  /// }
  ///
  /// let registry = Registry::new();
  /// registry.register_singleton_trait::<dyn Clock>(Arc::new(FixedClock));
  /// assert_eq!(registry.get::<dyn Clock>().unwrap().now(), 0);
  /// ```
  pub fn register_singleton_trait<I: ?Sized + Any + Send + Sync>(&self, instance: Arc<I>) {
    self.put_instance(ServiceKey::of::<I>(), Box::new(instance));
  }

  // --- Lazy Singleton Registration ---

  /// Registers a constructor that builds the singleton for `T` on first
  /// retrieval. Nothing is built at registration time, and the constructor
  /// runs at most once no matter how many threads race on the first `get`.
  ///
  /// The constructor must not resolve `T` from this same registry; that
  /// retrieval would deadlock in the one-shot gate. Resolving or registering
  /// *other* types from inside a constructor is fine.
  pub fn register_lazy_singleton<T, F>(&self, ctor: F)
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    let erased: ErasedCtor = Box::new(move || Box::new(Arc::new(ctor())));
    self.put_lazy(ServiceKey::of::<T>(), Some(erased));
  }

  /// Trait-object flavor of [`register_lazy_singleton`]: the constructor
  /// hands back an `Arc<I>` and the key is derived from `I`.
  ///
  /// [`register_lazy_singleton`]: Registry::register_lazy_singleton
  pub fn register_lazy_singleton_trait<I, F>(&self, ctor: F)
  where
    I: ?Sized + Any + Send + Sync,
    F: Fn() -> Arc<I> + Send + Sync + 'static,
  {
    let erased: ErasedCtor = Box::new(move || Box::new(ctor()));
    self.put_lazy(ServiceKey::of::<I>(), Some(erased));
  }

  /// Registers a lazy singleton slot for `T` with no constructor. Retrieval
  /// fails with [`Error::NoConstructorRegistered`], every time, until a real
  /// registration replaces the slot.
  pub fn register_placeholder<T: ?Sized + Any + Send + Sync>(&self) {
    self.put_lazy(ServiceKey::of::<T>(), None);
  }

  // --- Factory Registration ---

  /// Registers a constructor invoked fresh on every retrieval of `T`. The
  /// produced values are never cached and never share identity.
  pub fn register_factory<T, F>(&self, ctor: F)
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    let factory: SharedFactory = Arc::new(move || Box::new(Arc::new(ctor())));
    self.put_factory(ServiceKey::of::<T>(), factory);
  }

  /// Trait-object flavor of [`register_factory`].
  ///
  /// [`register_factory`]: Registry::register_factory
  pub fn register_factory_trait<I, F>(&self, ctor: F)
  where
    I: ?Sized + Any + Send + Sync,
    F: Fn() -> Arc<I> + Send + Sync + 'static,
  {
    let factory: SharedFactory = Arc::new(move || Box::new(ctor()));
    self.put_factory(ServiceKey::of::<I>(), factory);
  }

  // --- Retrieval ---

  /// Retrieves the service registered for `T`.
  ///
  /// Cached instances (eager singletons and already materialized lazy ones)
  /// are returned without running any user code. Otherwise the registered
  /// provider runs outside the registry lock: a lazy singleton is built
  /// through its one-shot gate and published for later calls, a factory is
  /// invoked for a fresh value.
  ///
  /// Fails with [`Error::NoProviderRegistered`] when nothing is registered
  /// for `T`, and with [`Error::NoConstructorRegistered`] when `T` was
  /// registered as a placeholder. Failures are returned, never panicked.
  pub fn get<T>(&self) -> Result<Arc<T>>
  where
    T: ?Sized + Any + Send + Sync,
  {
    let key = ServiceKey::of::<T>();

    let snapshot = {
      let state = self.state.read();
      if let Some(slot) = state.instances.get(&key) {
        trace!(service = key.type_name(), "resolved cached instance");
        return downcast_shared::<T>(slot, key);
      }
      match state.providers.get(&key) {
        Some(ProviderEntry::Lazy(lazy)) => Snapshot::Lazy(Arc::clone(lazy)),
        Some(ProviderEntry::Factory(factory)) => Snapshot::Factory(Arc::clone(factory)),
        None => Snapshot::Missing,
      }
    };

    match snapshot {
      Snapshot::Lazy(lazy) => self.materialize::<T>(key, &lazy),
      Snapshot::Factory(factory) => {
        let produced = factory();
        trace!(service = key.type_name(), "resolved fresh factory instance");
        downcast_shared::<T>(&produced, key)
      }
      Snapshot::Missing => Err(Error::NoProviderRegistered {
        type_name: key.type_name(),
      }),
    }
  }

  // --- Private Helpers ---

  /// Runs a lazy provider through its gate and, when this call is the one
  /// that fired it, publishes the value into `instances` so later retrievals
  /// take the cached-instance path.
  fn materialize<T>(&self, key: ServiceKey, lazy: &Arc<LazyService>) -> Result<Arc<T>>
  where
    T: ?Sized + Any + Send + Sync,
  {
    let (slot, fired) = lazy.force().ok_or(Error::NoConstructorRegistered {
      type_name: key.type_name(),
    })?;
    let instance = downcast_shared::<T>(slot, key)?;

    if fired {
      debug!(service = key.type_name(), "materialized lazy singleton");
      let mut state = self.state.write();
      // Publish only if this record is still the registered provider; a
      // registration that raced in after the gate fired must not be
      // clobbered.
      let current = matches!(
        state.providers.get(&key),
        Some(ProviderEntry::Lazy(entry)) if Arc::ptr_eq(entry, lazy)
      );
      if current {
        state.instances.insert(key, Box::new(instance.clone()));
      }
    } else {
      trace!(service = key.type_name(), "resolved materialized lazy singleton");
    }

    Ok(instance)
  }

  /// Stores a cached instance and evicts any provider registered for the same
  /// key, so the newest registration wins regardless of strategy.
  fn put_instance(&self, key: ServiceKey, slot: ErasedInstance) {
    let mut state = self.state.write();
    state.instances.insert(key, slot);
    state.providers.remove(&key);
    debug!(service = key.type_name(), "registered singleton instance");
  }

  fn put_lazy(&self, key: ServiceKey, ctor: Option<ErasedCtor>) {
    let placeholder = ctor.is_none();
    let entry = ProviderEntry::Lazy(Arc::new(LazyService::new(ctor)));
    self.put_provider(key, entry);
    debug!(
      service = key.type_name(),
      placeholder, "registered lazy singleton"
    );
  }

  fn put_factory(&self, key: ServiceKey, factory: SharedFactory) {
    self.put_provider(key, ProviderEntry::Factory(factory));
    debug!(service = key.type_name(), "registered factory");
  }

  /// Stores a provider and evicts any cached instance under the same key; the
  /// mirror image of [`put_instance`](Registry::put_instance).
  fn put_provider(&self, key: ServiceKey, entry: ProviderEntry) {
    let mut state = self.state.write();
    state.providers.insert(key, entry);
    state.instances.remove(&key);
  }
}

/// Recovers the `Arc<T>` from an erased slot. Key uniqueness guarantees the
/// slot under `T`'s key holds an `Arc<T>`; a mismatch is treated as an
/// unregistered type rather than a panic.
fn downcast_shared<T>(slot: &ErasedInstance, key: ServiceKey) -> Result<Arc<T>>
where
  T: ?Sized + Any + Send + Sync,
{
  slot
    .downcast_ref::<Arc<T>>()
    .cloned()
    .ok_or(Error::NoProviderRegistered {
      type_name: key.type_name(),
    })
}
