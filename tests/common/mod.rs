#![allow(dead_code)]

use std::cmp::Ordering;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{self, AtomicBool, AtomicUsize};
use std::sync::Arc;
use std::thread::{self, scope};
use std::time::{Duration, Instant};

use coarse_lists::test::adt::set::assert_ascending;
use coarse_lists::{CoarseListSet, ConcurrentSet, RwListSet};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Sets whose contents can be copied out in order.
pub trait Snapshot<T> {
    fn snapshot(&self) -> Vec<T>;
}

impl<T: Clone> Snapshot<T> for CoarseListSet<T> {
    fn snapshot(&self) -> Vec<T> {
        CoarseListSet::snapshot(self)
    }
}

impl<T: Clone> Snapshot<T> for RwListSet<T> {
    fn snapshot(&self) -> Vec<T> {
        RwListSet::snapshot(self)
    }
}

type Hook = Arc<dyn Fn() + Send + Sync>;

/// A key that runs a hook whenever it takes part in an ordering comparison. Equality checks stay
/// silent.
#[derive(Clone)]
pub struct HookedKey {
    pub id: u32,
    hook: Option<Hook>,
}

impl HookedKey {
    pub fn plain(id: u32) -> Self {
        Self { id, hook: None }
    }

    pub fn hooked(id: u32, hook: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            id,
            hook: Some(Arc::new(hook)),
        }
    }
}

impl fmt::Debug for HookedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HookedKey({})", self.id)
    }
}

impl PartialEq for HookedKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HookedKey {}

impl PartialOrd for HookedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HookedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        if let Some(hook) = self.hook.as_ref().or(other.hook.as_ref()) {
            hook();
        }
        self.id.cmp(&other.id)
    }
}

pub fn ids(keys: &[HookedKey]) -> Vec<u32> {
    keys.iter().map(|key| key.id).collect()
}

/// Holds everyone who arrives until `expected` threads are inside at once, or until `window`
/// runs out. Records the largest number of threads seen inside together.
pub struct Rendezvous {
    expected: usize,
    window: Duration,
    inside: AtomicUsize,
    peak: AtomicUsize,
    open: AtomicBool,
}

impl Rendezvous {
    pub fn new(expected: usize, window: Duration) -> Self {
        Self {
            expected,
            window,
            inside: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            open: AtomicBool::new(false),
        }
    }

    pub fn arrive(&self) {
        let now = self.inside.fetch_add(1, atomic::Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, atomic::Ordering::SeqCst);
        if now >= self.expected {
            self.open.store(true, atomic::Ordering::SeqCst);
        }

        let deadline = Instant::now() + self.window;
        while !self.open.load(atomic::Ordering::SeqCst) && Instant::now() < deadline {
            thread::yield_now();
        }
        self.inside.fetch_sub(1, atomic::Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(atomic::Ordering::SeqCst)
    }
}

/// Runs `readers` concurrent lookups that each park inside the set until all of them are in, and
/// returns how many were ever inside together.
pub fn overlapping_lookups<S>(readers: usize, window: Duration) -> usize
where
    S: ConcurrentSet<HookedKey> + Default + Sync,
{
    let set = S::default();
    assert!(set.insert(HookedKey::plain(0)));
    let rendezvous = Arc::new(Rendezvous::new(readers, window));

    scope(|s| {
        for _ in 0..readers {
            let rendezvous = Arc::clone(&rendezvous);
            let set = &set;
            s.spawn(move || {
                let hooked = HookedKey::hooked(1, move || rendezvous.arrive());
                assert!(!set.contains(&hooked));
            });
        }
    });

    rendezvous.peak()
}

pub fn walkthrough<S>()
where
    S: ConcurrentSet<u32> + Default + Snapshot<u32>,
{
    let set = S::default();
    assert!(set.insert(5));
    assert!(set.insert(3));
    assert!(!set.insert(5));
    assert!(set.contains(&3));
    assert!(set.remove(&3));
    assert!(!set.contains(&3));
    assert!(!set.remove(&3));
    assert_eq!(set.snapshot(), [5]);
}

pub fn idempotence<S>()
where
    S: ConcurrentSet<u32> + Default + Snapshot<u32>,
{
    let set = S::default();
    assert!(!set.remove(&7));
    assert!(!set.remove(&7));
    assert!(set.insert(7));
    assert!(!set.insert(7));
    assert!(set.remove(&7));
    assert!(!set.remove(&7));
    assert!(set.snapshot().is_empty());
}

/// 10 threads insert 10 disjoint keys each.
pub fn disjoint_inserts<S>()
where
    S: ConcurrentSet<u32> + Default + Sync + Snapshot<u32>,
{
    let set = S::default();

    scope(|s| {
        for t in 0..10 {
            let set = &set;
            s.spawn(move || {
                for i in 0..10 {
                    assert!(set.insert(i * 10 + t));
                }
            });
        }
    });

    assert_eq!(set.snapshot(), (0..100).collect::<Vec<_>>());
}

/// Every key a writer has inserted (and nobody removes) is found by a reader that starts looking
/// after the insert returned, while unrelated keys churn.
pub fn no_lost_insert<S>()
where
    S: ConcurrentSet<u32> + Default + Sync + Snapshot<u32>,
{
    const WRITERS: u32 = 4;
    const KEYS: u32 = 256;
    const CHURN_BASE: u32 = 1 << 20;

    let set = S::default();
    let (sender, receiver) = crossbeam_channel::unbounded();

    scope(|s| {
        for w in 0..WRITERS {
            let (set, sender) = (&set, sender.clone());
            s.spawn(move || {
                for i in 0..KEYS {
                    let key = i * WRITERS + w;
                    assert!(set.insert(key));
                    sender.send(key).unwrap();
                }
            });
        }
        drop(sender);

        let churn = &set;
        s.spawn(move || {
            for i in 0..4096 {
                let key = CHURN_BASE + i % 32;
                if i % 2 == 0 {
                    let _ = churn.insert(key);
                } else {
                    let _ = churn.remove(&key);
                }
            }
        });

        let checker = &set;
        s.spawn(move || {
            let mut seen = 0;
            for key in receiver {
                assert!(checker.contains(&key), "{key} lost");
                seen += 1;
            }
            assert_eq!(seen, WRITERS * KEYS);
        });
    });

    let snapshot = set.snapshot();
    assert_ascending(&snapshot);
    assert!(snapshot.starts_with(&(0..WRITERS * KEYS).collect::<Vec<_>>()));
}

/// A comparison that unwinds in the middle of an operation releases the lock and leaves the list
/// as it was.
pub fn unwinding_leaves_set_intact<S>()
where
    S: ConcurrentSet<HookedKey> + Default + Snapshot<HookedKey>,
{
    let set = S::default();
    assert!(set.insert(HookedKey::plain(0)));
    assert!(set.insert(HookedKey::plain(10)));
    let bomb = || HookedKey::hooked(5, || panic!("comparison failed"));

    assert!(catch_unwind(AssertUnwindSafe(|| set.insert(bomb()))).is_err());
    assert!(catch_unwind(AssertUnwindSafe(|| set.remove(&bomb()))).is_err());
    assert!(catch_unwind(AssertUnwindSafe(|| set.contains(&bomb()))).is_err());

    assert_eq!(ids(&set.snapshot()), [0, 10]);
    assert!(set.insert(HookedKey::plain(5)));
    assert!(set.remove(&HookedKey::plain(10)));
    assert_eq!(ids(&set.snapshot()), [0, 5]);
}
