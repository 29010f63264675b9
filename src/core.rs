//! Core, non-public data structures for the service locator.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::OnceCell;

/// An erased service value. Every slot holds an `Arc<T>` for the `T` its key
/// was derived from.
pub(crate) type ErasedInstance = Box<dyn Any + Send + Sync>;

/// An erased constructor producing an [`ErasedInstance`].
pub(crate) type ErasedCtor = Box<dyn Fn() -> ErasedInstance + Send + Sync>;

/// A shareable erased constructor, cloned out of the registry lock before it
/// is invoked.
pub(crate) type SharedFactory = Arc<dyn Fn() -> ErasedInstance + Send + Sync>;

/// The identity of a registered service: the `TypeId` of the type named by
/// the caller at the registration or retrieval site.
///
/// Equality and hashing consider the `TypeId` alone. The type name rides
/// along for diagnostics only; `std::any::type_name` output is not guaranteed
/// unique and must not participate in identity.
#[derive(Clone, Copy)]
pub(crate) struct ServiceKey {
  type_id: TypeId,
  type_name: &'static str,
}

impl ServiceKey {
  pub(crate) fn of<T: ?Sized + Any>() -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: std::any::type_name::<T>(),
    }
  }

  pub(crate) fn type_name(&self) -> &'static str {
    self.type_name
  }
}

impl PartialEq for ServiceKey {
  fn eq(&self, other: &Self) -> bool {
    self.type_id == other.type_id
  }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.type_id.hash(state);
  }
}

impl fmt::Debug for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ServiceKey({})", self.type_name)
  }
}

/// A registered provider for a type whose value is not (or not yet) cached.
pub(crate) enum ProviderEntry {
  /// Invoked fresh on every retrieval, never cached.
  Factory(SharedFactory),
  /// Constructed at most once, on first retrieval.
  Lazy(Arc<LazyService>),
}

/// A lazy singleton registration: an optional constructor plus the one-shot
/// cell the produced value is parked in.
///
/// The cell synchronizes itself; the registry lock is never held while the
/// constructor runs. A `None` constructor is a placeholder registration and
/// makes every retrieval fail the same way: the cell only ever caches
/// success.
pub(crate) struct LazyService {
  ctor: Option<ErasedCtor>,
  cell: OnceCell<ErasedInstance>,
}

impl LazyService {
  pub(crate) fn new(ctor: Option<ErasedCtor>) -> Self {
    Self {
      ctor,
      cell: OnceCell::new(),
    }
  }

  /// Runs the constructor through the one-shot gate and returns the cached
  /// value, along with whether this call is the one that fired the gate.
  /// `None` when no constructor was registered.
  pub(crate) fn force(&self) -> Option<(&ErasedInstance, bool)> {
    let ctor = self.ctor.as_ref()?;
    let mut fired = false;
    let slot = self.cell.get_or_init(|| {
      fired = true;
      ctor()
    });
    Some((slot, fired))
  }
}
