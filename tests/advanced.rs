use service_locator::{resolve, Registry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// --- Advanced Test Fixtures ---

trait Greeter: Send + Sync {
  fn greet(&self) -> String;
}

struct EnglishGreeter;
impl Greeter for EnglishGreeter {
  fn greet(&self) -> String {
    "Hello!".to_string()
  }
}

// A service with interior mutability, for identity and visibility tests.
struct HitCounter {
  hits: Mutex<u32>,
}

impl HitCounter {
  fn new() -> Self {
    Self {
      hits: Mutex::new(0),
    }
  }

  fn record(&self) {
    *self.hits.lock().unwrap() += 1;
  }

  fn total(&self) -> u32 {
    *self.hits.lock().unwrap()
  }
}

// --- Advanced Tests ---

#[test]
fn test_lazy_constructor_runs_once_under_concurrency() {
  // This test is critical for verifying the one-shot materialization gate.
  static BUILD_COUNT: AtomicUsize = AtomicUsize::new(0);

  struct ConcurrentService;

  // Arrange
  let registry = Registry::new();
  registry.register_lazy_singleton(|| {
    // This block should only ever be entered once across all threads.
    BUILD_COUNT.fetch_add(1, Ordering::SeqCst);
    // Widen the race window so a broken gate would actually be caught.
    thread::sleep(Duration::from_millis(50));
    ConcurrentService
  });

  // Act: many threads race on the very first retrieval.
  let retrieved: Mutex<Vec<Arc<ConcurrentService>>> = Mutex::new(Vec::new());
  thread::scope(|s| {
    for _ in 0..100 {
      s.spawn(|| {
        let service = registry.get::<ConcurrentService>().unwrap();
        retrieved.lock().unwrap().push(service);
      });
    }
  });

  // Assert
  assert_eq!(BUILD_COUNT.load(Ordering::SeqCst), 1);
  let retrieved = retrieved.into_inner().unwrap();
  assert_eq!(retrieved.len(), 100);
  // Every caller observed the identical value.
  for service in &retrieved {
    assert!(Arc::ptr_eq(service, &retrieved[0]));
  }
}

#[test]
fn test_concurrent_factory_calls_each_produce_a_fresh_value() {
  static SERIAL: AtomicUsize = AtomicUsize::new(0);

  struct Numbered {
    serial: usize,
  }

  // Arrange
  let registry = Registry::new();
  registry.register_factory(|| Numbered {
    serial: SERIAL.fetch_add(1, Ordering::SeqCst) + 1,
  });

  // Act
  let serials: Mutex<Vec<usize>> = Mutex::new(Vec::new());
  thread::scope(|s| {
    for _ in 0..100 {
      s.spawn(|| {
        let value = registry.get::<Numbered>().unwrap();
        serials.lock().unwrap().push(value.serial);
      });
    }
  });

  // Assert: exactly one constructor run per call, no duplicates, no skips.
  assert_eq!(SERIAL.load(Ordering::SeqCst), 100);
  let mut serials = serials.into_inner().unwrap();
  serials.sort_unstable();
  let expected: Vec<usize> = (1..=100).collect();
  assert_eq!(serials, expected);
}

#[test]
fn test_last_registration_wins_across_strategies() {
  #[derive(Debug, PartialEq, Eq)]
  struct Versioned {
    version: u32,
  }

  let registry = Registry::new();

  // A singleton first...
  registry.register_singleton(Versioned { version: 1 });
  assert_eq!(registry.get::<Versioned>().unwrap().version, 1);

  // ...replaced by a factory: retrieval now builds fresh values.
  registry.register_factory(|| Versioned { version: 2 });
  let f1 = registry.get::<Versioned>().unwrap();
  let f2 = registry.get::<Versioned>().unwrap();
  assert_eq!(f1.version, 2);
  assert!(!Arc::ptr_eq(&f1, &f2));

  // ...replaced by a placeholder: retrieval now fails.
  registry.register_placeholder::<Versioned>();
  assert!(registry.get::<Versioned>().is_err());

  // ...and finally by a singleton again.
  registry.register_singleton(Versioned { version: 3 });
  let s1 = registry.get::<Versioned>().unwrap();
  let s2 = registry.get::<Versioned>().unwrap();
  assert_eq!(s1.version, 3);
  assert!(Arc::ptr_eq(&s1, &s2));
}

#[test]
fn test_singleton_mutation_is_visible_to_later_gets() {
  // Arrange
  let registry = Registry::new();
  registry.register_singleton(HitCounter::new());

  // Act: mutate through one retrieved handle.
  let first = registry.get::<HitCounter>().unwrap();
  first.record();
  first.record();

  // Assert: a later retrieval sees the same underlying storage.
  let second = registry.get::<HitCounter>().unwrap();
  assert_eq!(second.total(), 2);
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_lazy_singleton_mutation_visible_after_materialization() {
  // Arrange
  let registry = Registry::new();
  registry.register_lazy_singleton(HitCounter::new);

  // Act: materialize, then mutate through the retrieved handle.
  let first = registry.get::<HitCounter>().unwrap();
  first.record();

  // Assert: the cached instance and the retrieved handle share storage.
  let second = registry.get::<HitCounter>().unwrap();
  assert_eq!(second.total(), 1);
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_factory_instances_do_not_share_state() {
  // Arrange
  let registry = Registry::new();
  registry.register_factory(HitCounter::new);

  // Act
  let first = registry.get::<HitCounter>().unwrap();
  first.record();
  first.record();
  let second = registry.get::<HitCounter>().unwrap();

  // Assert: mutating one instance never leaks into the next.
  assert_eq!(first.total(), 2);
  assert_eq!(second.total(), 0);
}

#[test]
fn test_constructor_may_use_the_registry_for_other_types() {
  // Constructors run outside the registry lock, so a lazy constructor can
  // resolve and register other types without deadlocking.

  struct Config {
    url: String,
  }
  struct Database {
    url: String,
  }

  // Arrange
  let registry = Arc::new(Registry::new());
  registry.register_singleton(Config {
    url: "postgres://localhost:5432/app".to_string(),
  });

  let handle = Arc::clone(&registry);
  registry.register_lazy_singleton(move || {
    let config = handle.get::<Config>().unwrap();
    Database {
      url: config.url.clone(),
    }
  });

  // Act
  let database = registry.get::<Database>().unwrap();

  // Assert
  assert_eq!(database.url, "postgres://localhost:5432/app");
}

#[test]
fn test_concurrent_registration_and_resolution() {
  // A stress test to ensure registering while resolving does not deadlock or
  // corrupt the maps.

  #[derive(Debug)]
  struct Common {
    id: usize,
  }

  // Arrange: pre-register so readers never observe a missing type.
  let registry = Registry::new();
  registry.register_singleton(Common { id: 0 });

  // Act
  let registry = &registry;
  thread::scope(|s| {
    for writer in 0..8 {
      s.spawn(move || {
        for i in 0..50 {
          registry.register_singleton(Common {
            id: writer * 50 + i + 1,
          });
        }
      });
    }
    for _ in 0..8 {
      s.spawn(move || {
        for _ in 0..200 {
          let common = registry.get::<Common>().unwrap();
          assert!(common.id <= 400);
        }
      });
    }
  });

  // Assert: the registry still resolves after the churn.
  let survivor = registry.get::<Common>().unwrap();
  assert!(survivor.id >= 1);
}

#[test]
fn test_trait_object_lazy_singleton_shares_identity() {
  // Arrange
  let registry = Registry::new();
  registry.register_lazy_singleton_trait::<dyn Greeter, _>(|| Arc::new(EnglishGreeter));

  // Act
  let g1 = resolve!(registry, trait Greeter).unwrap();
  let g2 = resolve!(registry, trait Greeter).unwrap();

  // Assert
  assert_eq!(g1.greet(), "Hello!");
  assert!(Arc::ptr_eq(&g1, &g2));
}

#[test]
fn test_dropping_registry_drops_cached_singletons() {
  // The registry's lifetime governs its contents: dropping it must release
  // every cached singleton.

  static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

  struct ConnectionPool;
  impl Drop for ConnectionPool {
    fn drop(&mut self) {
      DROP_COUNT.fetch_add(1, Ordering::SeqCst);
    }
  }

  // Arrange
  let registry = Registry::new();
  registry.register_lazy_singleton(|| ConnectionPool);

  // Act
  // 1. Materialize the singleton.
  let pool = registry.get::<ConnectionPool>().unwrap();
  assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 0);

  // 2. Dropping the retrieved handle must not drop the value; the registry
  //    still holds it.
  drop(pool);
  assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 0);

  // 3. Dropping the registry releases the last references.
  drop(registry);

  // Assert
  assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 1);
}
