use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use recycle_pool::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    Init(u32),
    Allocate(u32),
    Deallocate(u32),
    Destroy(u32),
}

type Log = Rc<RefCell<Vec<Event>>>;

#[derive(Debug)]
struct Tracked {
    serial: u32,
    log: Log,
}

impl Poolable for Tracked {
    fn init(&mut self, _owner: PoolLink<Self>) {
        self.log.borrow_mut().push(Event::Init(self.serial));
    }

    fn on_allocate(&mut self) {
        self.log.borrow_mut().push(Event::Allocate(self.serial));
    }

    fn on_deallocate(&mut self) {
        self.log.borrow_mut().push(Event::Deallocate(self.serial));
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().push(Event::Destroy(self.serial));
    }
}

/// Generator that numbers instances from 1 and fails for the serials in
/// `failing`.
fn tracked_generator(log: &Log, failing: &'static [u32]) -> impl Generator<Tracked> {
    let log = Rc::clone(log);
    let counter = Cell::new(0);
    FnGenerator::new(move || {
        counter.set(counter.get() + 1);
        let serial = counter.get();
        if failing.contains(&serial) {
            return Err(GeneratorError::new::<Tracked>("template is invalid"));
        }
        Ok(Tracked {
            serial,
            log: Rc::clone(&log),
        })
    })
}

fn tracked_pool(initial_size: usize) -> (RawPool<Tracked>, Log) {
    let log = Log::default();
    let pool = RawPool::new(tracked_generator(&log, &[]));
    pool.initialize(initial_size).unwrap();
    (pool, log)
}

fn serials(items: &[Pooled<Tracked>]) -> Vec<u32> {
    items.iter().map(|item| item.borrow().serial).collect()
}

#[test]
fn test_uninitialized() {
    let log = Log::default();
    let pool = RawPool::new(tracked_generator(&log, &[]));

    assert_eq!(pool.state(), PoolState::Uninitialized);
    assert_eq!(pool.size(), 0);
    assert!(matches!(pool.acquire(), Err(PoolError::NotInitialized)));
    assert!(matches!(pool.recycle_all(), Err(PoolError::NotInitialized)));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_initialize() {
    let (pool, log) = tracked_pool(2);

    assert_eq!(pool.state(), PoolState::Active);
    assert_eq!(pool.size(), 2);
    assert_eq!(pool.available_count(), 2);
    assert_eq!(pool.allocated_count(), 0);
    assert_eq!(*log.borrow(), [Event::Init(1), Event::Init(2)]);
    assert!(matches!(
        pool.initialize(2),
        Err(PoolError::AlreadyInitialized)
    ));
}

#[test]
fn test_initialize_failure_keeps_pool_empty() {
    let log = Log::default();
    let pool = RawPool::new(tracked_generator(&log, &[3]));

    let err = pool.initialize(4).unwrap_err();
    assert!(matches!(err, PoolError::GeneratorFailure(_)));
    assert_eq!(pool.state(), PoolState::Uninitialized);
    assert_eq!(pool.size(), 0);
    assert_eq!(
        *log.borrow(),
        [
            Event::Init(1),
            Event::Init(2),
            Event::Destroy(1),
            Event::Destroy(2)
        ]
    );

    // Retrying is up to the caller.
    pool.initialize(2).unwrap();
    assert_eq!(pool.size(), 2);
}

#[test]
fn test_growth_failure_leaves_pool_untouched() {
    let log = Log::default();
    let pool = RawPool::new(tracked_generator(&log, &[2]));
    pool.initialize(1).unwrap();

    let _first = pool.acquire().unwrap();
    assert!(matches!(pool.acquire(), Err(PoolError::GeneratorFailure(_))));
    assert_eq!(pool.size(), 1);
    assert_eq!(pool.available_count(), 0);
    assert_eq!(pool.allocated_count(), 1);

    let second = pool.acquire().unwrap();
    assert_eq!(second.borrow().serial, 3);
    assert_eq!(pool.size(), 2);
}

#[test]
fn test_acquire_calls_on_allocate_once() {
    let (pool, log) = tracked_pool(1);
    let item = pool.acquire().unwrap();

    assert_eq!(*log.borrow(), [Event::Init(1), Event::Allocate(1)]);
    assert!(pool.contains(&item));
}

#[test]
fn test_fifo_reuse() {
    let (pool, _log) = tracked_pool(3);
    let items: Vec<_> = (0..3).map(|_| pool.acquire().unwrap()).collect();
    assert_eq!(serials(&items), [1, 2, 3]);

    for index in [2, 0, 1] {
        pool.recycle(&items[index]).unwrap();
    }

    let again: Vec<_> = (0..3).map(|_| pool.acquire().unwrap()).collect();
    assert_eq!(serials(&again), [3, 1, 2]);
    assert_eq!(pool.size(), 3);
}

#[test]
fn test_foreign_instance() {
    let (pool, _log) = tracked_pool(1);
    let (other, _other_log) = tracked_pool(1);
    let foreign = other.acquire().unwrap();

    assert!(!pool.contains(&foreign));
    let err = pool.recycle(&foreign).unwrap_err();
    assert!(matches!(err, PoolError::ForeignInstance { id } if id == foreign.id()));
    assert_eq!(pool.size(), 1);
    assert_eq!(pool.available_count(), 1);
    assert_eq!(other.allocated_count(), 1);
}

#[test]
fn test_double_recycle_is_rejected() {
    let (pool, log) = tracked_pool(1);
    let item = pool.acquire().unwrap();
    pool.recycle(&item).unwrap();

    let err = pool.recycle(&item).unwrap_err();
    assert!(matches!(err, PoolError::AlreadyAvailable { .. }));
    assert_eq!(pool.available_count(), 1);
    assert_eq!(
        log.borrow()
            .iter()
            .filter(|event| matches!(event, Event::Deallocate(_)))
            .count(),
        1
    );

    // The rested instance is handed out only once.
    let _again = pool.acquire().unwrap();
    assert_eq!(pool.available_count(), 0);
    assert_eq!(pool.size(), 1);
}

#[test]
fn test_recycle_all() {
    let (pool, _log) = tracked_pool(2);
    let items: Vec<_> = (0..3).map(|_| pool.acquire().unwrap()).collect();

    assert_eq!(pool.recycle_all().unwrap(), 3);
    assert_eq!(pool.available_count(), 3);
    assert_eq!(pool.allocated_count(), 0);
    assert_eq!(pool.recycle_all().unwrap(), 0);

    let again: Vec<_> = (0..3).map(|_| pool.acquire().unwrap()).collect();
    assert_eq!(serials(&again), serials(&items));
}

#[test]
fn test_recycle_by_id() {
    let (pool, _log) = tracked_pool(1);
    let item = pool.acquire().unwrap();
    let id = item.id();
    drop(item);

    pool.recycle_id(id).unwrap();
    assert_eq!(pool.available_count(), 1);
}

#[test]
fn test_destroy_order() {
    let (pool, log) = tracked_pool(2);
    let first = pool.acquire().unwrap();
    let _second = pool.acquire().unwrap();
    pool.recycle(&first).unwrap();
    let _third = pool.acquire().unwrap();
    log.borrow_mut().clear();

    pool.destroy().unwrap();
    assert_eq!(
        *log.borrow(),
        [
            Event::Deallocate(2),
            Event::Destroy(2),
            Event::Deallocate(1),
            Event::Destroy(1),
        ]
    );
    assert!(pool.is_destroyed());
    assert!(!pool.contains(&first));
}

#[test]
fn test_destroy_available_orphans_allocated() {
    let (pool, log) = tracked_pool(2);
    let orphan = pool.acquire().unwrap();
    log.borrow_mut().clear();

    pool.destroy_available().unwrap();
    assert_eq!(*log.borrow(), [Event::Destroy(2)]);
    assert_eq!(pool.size(), 0);
    assert_eq!(pool.available_count(), 0);

    // The holder still owns the orphan, the pool does not take it back.
    assert_eq!(orphan.borrow().serial, 1);
    assert!(!orphan.link().is_attached());
    assert!(matches!(pool.recycle(&orphan), Err(PoolError::PoolDestroyed)));
    assert!(matches!(orphan.recycle(), Err(PoolError::PoolDestroyed)));

    drop(pool);
    assert_eq!(*log.borrow(), [Event::Destroy(2)]);
}

#[test]
fn test_destroy_uninitialized() {
    let log = Log::default();
    let pool = RawPool::new(tracked_generator(&log, &[]));

    pool.destroy().unwrap();
    assert_eq!(pool.state(), PoolState::Destroyed);
    assert!(matches!(pool.initialize(1), Err(PoolError::PoolDestroyed)));
    assert!(matches!(pool.acquire(), Err(PoolError::PoolDestroyed)));
}
