//! Relay driver: the public surface of the crate.
//!
//! [`RelayDriver`] owns the relay records, their configuration, the I/O
//! port and the tick source behind a single blocking mutex.  Every public
//! call takes the lock for its whole duration, delivers at most one event
//! per relay to the [`Engine`], and releases it.
//!
//! ```text
//!  request_open / request_close ─┐
//!  self_check_tick (Poller) ─────┼─▶ lock ─▶ Engine::step(ctx, event) ─▶ unlock
//!  deinit ───────────────────────┘              │
//!                                               ├─▶ DigitalOutputs::write
//!                                               └─▶ listeners (synchronous)
//! ```
//!
//! ## Reentrancy
//!
//! Hardware writes and listener callbacks run while the lock is held.  A
//! listener that calls back into the same driver will panic on the inner
//! `RefCell` borrow.  Listeners must only record or forward the notice.
//!
//! ## Relay ids
//!
//! Ids are checked against the configured relay count.  Mutating calls with
//! an out-of-range id return [`RelayError::InvalidRelay`]; queries return
//! the "no information" defaults ([`RelayState::Uninit`],
//! [`RelayFault::None`]).

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use heapless::Vec;
use log::{debug, info, warn};

use crate::app::listeners::{FaultListener, ListenerId, StateListener};
use crate::app::ports::{PollRoutine, PollState, RelayIo, TickSource};
use crate::config::{self, MAX_RELAYS, RelayConfig};
use crate::error::{RelayError, Result};
use crate::fsm::context::{RelayContext, RelayRecord};
use crate::fsm::{Engine, Event, StateId};
use crate::safety::{RelayFault, RelayState};

/// Index of a relay in the configuration table.
pub type RelayId = usize;

/// Upper bound on steps a shutdown may take per relay.  Any initialised
/// state reaches `Uninit` in two.
const MAX_SHUTDOWN_STEPS: usize = StateId::COUNT;

// ───────────────────────────────────────────────────────────────
// Registry contents
// ───────────────────────────────────────────────────────────────

struct Registry<IO, C> {
    initialized: bool,
    configs: Vec<RelayConfig, MAX_RELAYS>,
    records: Vec<RelayRecord, MAX_RELAYS>,
    io: IO,
    clock: C,
}

impl<IO: RelayIo, C: TickSource> Registry<IO, C> {
    /// Deliver `event` to one relay.
    fn step(&mut self, engine: &Engine, id: RelayId, event: Event) {
        let mut ctx = RelayContext {
            id,
            config: &self.configs[id],
            record: &mut self.records[id],
            io: &mut self.io,
            clock: &self.clock,
        };
        engine.step(&mut ctx, event);
    }

    fn check_id(&self, id: RelayId) -> Result<()> {
        if id < self.records.len() {
            Ok(())
        } else {
            Err(RelayError::InvalidRelay(id))
        }
    }

    /// Machine state of an initialised, in-range relay.
    fn state_of(&self, id: RelayId) -> Option<StateId> {
        if !self.initialized {
            return None;
        }
        self.records.get(id).map(|r| r.state)
    }
}

// ───────────────────────────────────────────────────────────────
// RelayDriver
// ───────────────────────────────────────────────────────────────

/// Supervises a fixed set of relays.
///
/// Construct one at startup with the board's I/O port and tick source,
/// then [`init`](Self::init) it with the relay table.  Share it by
/// reference (or `Arc`) with the [`Poller`](crate::scheduler::Poller)
/// that delivers self-checks.
pub struct RelayDriver<IO, C, M: RawMutex = CriticalSectionRawMutex> {
    engine: Engine,
    inner: Mutex<M, RefCell<Registry<IO, C>>>,
}

impl<IO, C, M> RelayDriver<IO, C, M>
where
    IO: RelayIo,
    C: TickSource,
    M: RawMutex,
{
    /// Create an uninitialised driver.  No I/O is performed.
    pub fn new(io: IO, clock: C) -> Self {
        Self {
            engine: Engine::new(),
            inner: Mutex::new(RefCell::new(Registry {
                initialized: false,
                configs: Vec::new(),
                records: Vec::new(),
                io,
                clock,
            })),
        }
    }

    fn with_registry<R>(&self, f: impl FnOnce(&mut Registry<IO, C>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Validate and take the relay table, seeding every relay in its
    /// resting state.  No hardware command is issued.
    ///
    /// Fails with [`RelayError::AlreadyInitialized`] without touching any
    /// relay when called twice.
    pub fn init(&self, relays: &[RelayConfig]) -> Result<()> {
        self.with_registry(|reg| {
            if reg.initialized {
                warn!("relay init rejected: already initialised");
                return Err(RelayError::AlreadyInitialized);
            }

            config::validate(relays).inspect_err(|e| warn!("relay init rejected: {e}"))?;

            reg.configs.clear();
            reg.records.clear();
            for c in relays {
                // validate() bounds the table to MAX_RELAYS.
                let _ = reg.configs.push(*c);
                let _ = reg.records.push(RelayRecord::resting(c.kind));
            }
            log_config(&reg.configs);

            reg.initialized = true;
            info!("relay driver initialised with {} relays", relays.len());
            Ok(())
        })
    }

    /// Drive every relay to its fail-safe resting output and mark the
    /// driver uninitialised.  Does nothing when already uninitialised.
    pub fn deinit(&self) {
        self.with_registry(|reg| {
            if !reg.initialized {
                debug!("relay deinit: not initialised");
                return;
            }

            for id in 0..reg.records.len() {
                let mut steps = 0;
                while reg.records[id].state != StateId::Uninit && steps < MAX_SHUTDOWN_STEPS {
                    reg.step(&self.engine, id, Event::Shutdown);
                    steps += 1;
                }
                debug_assert_eq!(reg.records[id].state, StateId::Uninit);
            }

            reg.initialized = false;
            info!("relay driver deinitialised");
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.with_registry(|reg| reg.initialized)
    }

    /// Number of configured relays, 0 while uninitialised.
    pub fn relay_count(&self) -> usize {
        self.with_registry(|reg| if reg.initialized { reg.records.len() } else { 0 })
    }

    // ── Periodic self-check ───────────────────────────────────

    /// Deliver a self-check to every relay.  Reports [`PollState::Idle`]
    /// once the driver is uninitialised so the poller can stop.
    pub fn self_check_tick(&self) -> PollState {
        self.with_registry(|reg| {
            if !reg.initialized {
                return PollState::Idle;
            }
            for id in 0..reg.records.len() {
                reg.step(&self.engine, id, Event::SelfCheck);
            }
            PollState::Active
        })
    }

    // ── Switching ─────────────────────────────────────────────

    /// Request the contact to open.  Accepted (and possibly ignored by the
    /// state machine) whenever the driver is initialised.
    pub fn request_open(&self, relay: RelayId) -> Result<()> {
        self.deliver(relay, Event::RequestOpen)
    }

    /// Request the contact to close.
    pub fn request_close(&self, relay: RelayId) -> Result<()> {
        self.deliver(relay, Event::RequestClose)
    }

    fn deliver(&self, relay: RelayId, event: Event) -> Result<()> {
        let result = self.with_registry(|reg| {
            if !reg.initialized {
                return Err(RelayError::NotInitialized);
            }
            reg.check_id(relay)?;
            reg.step(&self.engine, relay, event);
            Ok(())
        });

        match result {
            Ok(()) => debug!("relay {}: {:?} accepted", relay, event),
            Err(e) => warn!("relay {}: {:?} rejected: {}", relay, event, e),
        }
        result
    }

    // ── Queries ───────────────────────────────────────────────

    /// Coarse position of a relay.  Transitional states report the side
    /// they are leaving; latched faults report the side they are stuck on.
    pub fn get_state(&self, relay: RelayId) -> RelayState {
        self.query(relay).map_or(RelayState::Uninit, RelayState::of)
    }

    /// Latched fault of a relay, [`RelayFault::None`] if healthy.
    pub fn get_fault(&self, relay: RelayId) -> RelayFault {
        self.query(relay).map_or(RelayFault::None, RelayFault::of)
    }

    /// Full machine state of a relay, without the aliasing of
    /// [`get_state`](Self::get_state).
    pub fn machine_state(&self, relay: RelayId) -> Result<StateId> {
        self.with_registry(|reg| {
            if !reg.initialized {
                return Err(RelayError::NotInitialized);
            }
            reg.check_id(relay)?;
            Ok(reg.records[relay].state)
        })
    }

    fn query(&self, relay: RelayId) -> Option<StateId> {
        let (initialized, state) = self.with_registry(|reg| (reg.initialized, reg.state_of(relay)));
        if initialized && state.is_none() {
            warn!("relay {}: query for unknown relay", relay);
        }
        state
    }

    // ── Listeners ─────────────────────────────────────────────

    /// Register an observer of confirmed position changes.
    pub fn add_state_listener(
        &self,
        relay: RelayId,
        listener: &'static dyn StateListener,
    ) -> Result<ListenerId> {
        self.with_registry(|reg| {
            if !reg.initialized {
                return Err(RelayError::NotInitialized);
            }
            reg.check_id(relay)?;
            reg.records[relay].state_listeners.add(listener)
        })
        .inspect(|id| debug!("relay {}: state listener {} added", relay, id))
        .inspect_err(|e| warn!("relay {}: state listener rejected: {}", relay, e))
    }

    /// Register an observer of latched faults.
    pub fn add_fault_listener(
        &self,
        relay: RelayId,
        listener: &'static dyn FaultListener,
    ) -> Result<ListenerId> {
        self.with_registry(|reg| {
            if !reg.initialized {
                return Err(RelayError::NotInitialized);
            }
            reg.check_id(relay)?;
            reg.records[relay].fault_listeners.add(listener)
        })
        .inspect(|id| debug!("relay {}: fault listener {} added", relay, id))
        .inspect_err(|e| warn!("relay {}: fault listener rejected: {}", relay, e))
    }

    // ── I/O access ────────────────────────────────────────────

    /// Run `f` with the owned I/O port, under the driver lock.
    pub fn with_io<R>(&self, f: impl FnOnce(&mut IO) -> R) -> R {
        self.with_registry(|reg| f(&mut reg.io))
    }
}

impl<IO, C, M> PollRoutine for RelayDriver<IO, C, M>
where
    IO: RelayIo,
    C: TickSource,
    M: RawMutex,
{
    fn poll(&self) -> PollState {
        self.self_check_tick()
    }
}

fn log_config(relays: &[RelayConfig]) {
    for (i, c) in relays.iter().enumerate() {
        match c.feedback_line {
            Some(line) => info!(
                "relay[{}]: {} control=DO{} feedback=DI{} response={} ticks",
                i,
                c.kind.short_name(),
                c.control_line,
                line,
                c.response_ticks
            ),
            None => info!(
                "relay[{}]: {} control=DO{} feedback=none response={} ticks",
                i,
                c.kind.short_name(),
                c.control_line,
                c.response_ticks
            ),
        }
    }
}
