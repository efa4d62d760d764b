// crates/interceptor/src/interceptor.rs
//! Bandwidth throttling and offline emulation for in-flight transactions

use crate::timer::DeferredTimer;
use crate::transaction::{NetworkTransaction, TransactionId, TransactionRef};
use slowwire_conditions::NetworkConditions;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::time::Instant;

/// Virtual packet size used to meter throttled transfers, in bytes.
/// Matches a typical Ethernet MTU.
const PACKET_SIZE: i64 = 1500;

/// Upper bound on how far out a wake-up may be scheduled when the exact
/// deadline is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Converts a download throughput in bytes per second into the virtual
/// tick length, clamped to a minimum of one microsecond.
fn tick_length(download_throughput: u64) -> Duration {
    let us = (PACKET_SIZE as u64).saturating_mul(1_000_000) / download_throughput.max(1);
    Duration::from_micros(us.max(1))
}

/// Entry in the round-robin throttle queue
struct ThrottledEntry {
    id: TransactionId,
    transaction: Weak<dyn NetworkTransaction>,
}

struct Inner {
    conditions: Arc<NetworkConditions>,
    transactions: HashMap<TransactionId, Weak<dyn NetworkTransaction>>,
    throttled: VecDeque<ThrottledEntry>,
    offset: Instant,
    tick_length: Duration,
    last_tick: u64,
    timer: DeferredTimer,
}

impl Inner {
    /// Number of whole virtual ticks elapsed since the clock origin.
    fn elapsed_ticks(&self, now: Instant) -> u64 {
        let tick_us = self.tick_length.as_micros().max(1);
        let elapsed_us = now.duration_since(self.offset).as_micros();
        (elapsed_us / tick_us).min(u128::from(u64::MAX)) as u64
    }

    /// Credits the byte budget accumulated since the last reconciliation
    /// round-robin across the throttle queue, then rotates the queue so
    /// remainder ticks do not permanently favor the front positions.
    fn update_throttles(&mut self) {
        if self.tick_length.is_zero() {
            return;
        }

        let total_ticks = self.elapsed_ticks(Instant::now());
        let ticks = total_ticks.saturating_sub(self.last_tick);
        self.last_tick = total_ticks;

        let length = self.throttled.len() as u64;
        if length == 0 {
            return;
        }

        let whole = ticks / length;
        let shift = ticks % length;
        for (position, entry) in self.throttled.iter().enumerate() {
            let Some(transaction) = entry.transaction.upgrade() else {
                continue;
            };
            let mut credit = whole.saturating_mul(PACKET_SIZE as u64);
            if (position as u64) < shift {
                credit = credit.saturating_add(PACKET_SIZE as u64);
            }
            transaction.decrease_throttled_byte_count(i64::try_from(credit).unwrap_or(i64::MAX));
        }
        self.throttled.rotate_left(shift as usize);
    }

    /// Schedules the next wake-up for the earliest transaction that could
    /// pay off its byte debt, given the round-robin distribution order.
    fn arm_timer(&mut self, weak: WeakNetworkInterceptor) {
        let length = self.throttled.len();
        if length == 0 || self.tick_length.is_zero() {
            self.timer.stop();
            return;
        }

        let mut min_ticks_left = i64::MAX;
        for (position, entry) in self.throttled.iter().enumerate() {
            let debt = entry
                .transaction
                .upgrade()
                .map_or(0, |transaction| transaction.throttled_byte_count());
            let packets_left = debt.max(0).saturating_add(PACKET_SIZE - 1) / PACKET_SIZE;
            let ticks_left = (position as i64 + 1)
                .saturating_add((length as i64).saturating_mul(packets_left - 1));
            min_ticks_left = min_ticks_left.min(ticks_left);
        }

        let target_tick = self.last_tick.saturating_add(min_ticks_left.max(0) as u64);
        let deadline = self.tick_deadline(target_tick);
        log::trace!("throttle timer armed for virtual tick {}", target_tick);

        let generation = self.timer.next_generation();
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(interceptor) = weak.upgrade() {
                interceptor.on_timer(generation);
            }
        });
        self.timer.set_task(task);
    }

    /// Absolute deadline of the given virtual tick. Unrepresentable
    /// deadlines saturate to a far-future wake-up.
    fn tick_deadline(&self, tick: u64) -> Instant {
        let tick_us = self.tick_length.as_micros().min(u128::from(u64::MAX)) as u64;
        let delta = Duration::from_micros(tick_us.saturating_mul(tick));
        self.offset.checked_add(delta).unwrap_or_else(|| {
            let now = Instant::now();
            now.checked_add(FAR_FUTURE).unwrap_or(now)
        })
    }
}

/// Simulates bandwidth-limited and offline network conditions for a set
/// of in-flight transactions.
///
/// The interceptor models a virtual packet clock: while throttling is
/// active, one packet-sized unit of byte budget becomes available per
/// tick and is distributed round-robin across the throttled queue. A
/// transaction is released (its throttled callback fires) once its byte
/// debt is paid off. While offline, eligible transactions are failed
/// instead.
///
/// Handles are cheap to clone and share state. The timer runs on the
/// ambient tokio runtime, so mutating operations must be called from
/// within one.
#[derive(Clone)]
pub struct NetworkInterceptor {
    inner: Arc<Mutex<Inner>>,
}

impl NetworkInterceptor {
    /// Creates an interceptor with default (online, unthrottled)
    /// conditions
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                conditions: Arc::new(NetworkConditions::default()),
                transactions: HashMap::new(),
                throttled: VecDeque::new(),
                offset: Instant::now(),
                tick_length: Duration::ZERO,
                last_tick: 0,
                timer: DeferredTimer::new(),
            })),
        }
    }

    /// Returns a non-owning handle that does not extend the interceptor's
    /// lifetime
    pub fn downgrade(&self) -> WeakNetworkInterceptor {
        WeakNetworkInterceptor {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the currently active conditions
    pub fn conditions(&self) -> Arc<NetworkConditions> {
        Arc::clone(&self.lock().conditions)
    }

    /// Registers a transaction as active.
    ///
    /// Registering the same transaction twice is a contract violation.
    pub fn add_transaction(&self, transaction: &TransactionRef) {
        let mut inner = self.lock();
        let id = transaction.id();
        debug_assert!(
            !inner.transactions.contains_key(&id),
            "transaction {id} registered twice"
        );
        inner.transactions.insert(id, Arc::downgrade(transaction));
    }

    /// Unregisters a transaction.
    ///
    /// The transaction must be registered. Safe to call whether or not it
    /// was ever throttled; accumulated byte debt of the remaining queue is
    /// reconciled first so no virtual time is lost.
    pub fn remove_transaction(&self, transaction: &TransactionRef) {
        let mut inner = self.lock();
        let id = transaction.id();
        debug_assert!(
            inner.transactions.contains_key(&id),
            "removing unregistered transaction {id}"
        );
        inner.transactions.remove(&id);

        if !inner.conditions.is_throttling() {
            return;
        }

        inner.update_throttles();
        inner.throttled.retain(|entry| entry.id != id);
        inner.arm_timer(self.downgrade());
    }

    /// Replaces the active conditions.
    ///
    /// Byte debt accumulated under the previous policy is reconciled with
    /// the old tick length before the swap. Going offline fails every
    /// eligible active transaction; disabling throttling releases
    /// everything still queued.
    pub fn update_conditions(&self, conditions: Arc<NetworkConditions>) {
        let mut inner = self.lock();
        if inner.conditions.is_throttling() {
            inner.update_throttles();
        }
        inner.conditions = Arc::clone(&conditions);
        log::debug!("network conditions changed: {}", conditions);

        if conditions.offline() {
            inner.timer.stop();
            inner.throttled.clear();
            let snapshot: Vec<(TransactionId, Weak<dyn NetworkTransaction>)> = inner
                .transactions
                .iter()
                .map(|(id, weak)| (*id, Weak::clone(weak)))
                .collect();
            drop(inner);

            for (id, weak) in snapshot {
                let Some(transaction) = weak.upgrade() else {
                    continue;
                };
                // A fail callback may remove other transactions
                // mid-iteration; re-check membership each step.
                if !self.lock().transactions.contains_key(&id) {
                    continue;
                }
                if !transaction.has_request() || transaction.failed() {
                    continue;
                }
                if self.should_fail(transaction.as_ref()) {
                    transaction.fail();
                }
            }
            return;
        }

        if conditions.is_throttling() {
            inner.offset = Instant::now();
            inner.last_tick = 0;
            inner.tick_length = tick_length(conditions.download_throughput());
            inner.arm_timer(self.downgrade());
        } else {
            inner.timer.stop();
            let released: Vec<TransactionRef> = inner
                .throttled
                .drain(..)
                .filter_map(|entry| entry.transaction.upgrade())
                .collect();
            drop(inner);

            for transaction in released {
                transaction.fire_throttled_callback();
            }
        }
    }

    /// Appends a transaction to the throttle queue.
    ///
    /// Callers decide eligibility via [`should_throttle`]; the queue is
    /// reconciled up to now before the append so the newcomer does not
    /// dilute budget already earned by the others.
    ///
    /// [`should_throttle`]: NetworkInterceptor::should_throttle
    pub fn throttle_transaction(&self, transaction: &TransactionRef) {
        let mut inner = self.lock();
        inner.update_throttles();
        inner.throttled.push_back(ThrottledEntry {
            id: transaction.id(),
            transaction: Arc::downgrade(transaction),
        });
        inner.arm_timer(self.downgrade());
    }

    /// True if the transaction should be failed under the current
    /// conditions: offline, and the request was not initiated by page
    /// script.
    pub fn should_fail(&self, transaction: &dyn NetworkTransaction) -> bool {
        let offline = self.lock().conditions.offline();
        if !offline {
            return false;
        }
        transaction.request_initiator().is_empty()
    }

    /// True if the transaction should be rate-limited under the current
    /// conditions: throttling active, and the request was not initiated
    /// by page script.
    pub fn should_throttle(&self, transaction: &dyn NetworkTransaction) -> bool {
        let throttling = self.lock().conditions.is_throttling();
        if !throttling {
            return false;
        }
        transaction.request_initiator().is_empty()
    }

    /// Timer fire: reconcile, release every transaction whose debt is paid
    /// off, and re-arm for the reduced queue.
    fn on_timer(&self, generation: u64) {
        let mut inner = self.lock();
        if !inner.timer.is_current(generation) {
            return;
        }
        inner.update_throttles();

        let mut finished: Vec<TransactionRef> = Vec::new();
        let entries = std::mem::take(&mut inner.throttled);
        for entry in entries {
            match entry.transaction.upgrade() {
                Some(transaction) => {
                    if transaction.throttled_byte_count() <= 0 {
                        finished.push(transaction);
                    } else {
                        inner.throttled.push_back(entry);
                    }
                }
                // Dropped without removal; compact it out.
                None => {}
            }
        }
        drop(inner);

        // Callbacks run unlocked and may re-enter any operation.
        for transaction in finished {
            transaction.fire_throttled_callback();
        }

        let mut inner = self.lock();
        inner.arm_timer(self.downgrade());
    }
}

impl Default for NetworkInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-owning handle to a [`NetworkInterceptor`]
#[derive(Clone)]
pub struct WeakNetworkInterceptor {
    inner: Weak<Mutex<Inner>>,
}

impl WeakNetworkInterceptor {
    /// Upgrades to a strong handle if the interceptor is still alive
    pub fn upgrade(&self) -> Option<NetworkInterceptor> {
        self.inner
            .upgrade()
            .map(|inner| NetworkInterceptor { inner })
    }
}
