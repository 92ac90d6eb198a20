use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use log::{debug, error, trace, warn};
use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};

use crate::bodies::BodyDef;
use crate::core::{
    BodyHandle, BodyTransform, ControllerConfig, PhysicsWorld, SharedGravity, SimulationConfig, StepListener,
    WorldSnapshot,
};
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::shapes::Shape;
use crate::Result;

/// Lifecycle of a [`PhysicsController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not stepping; commands are still served
    Paused,

    /// Stepping at the configured interval
    Active,

    /// Terminal: the stepping thread has exited, the world is gone
    Destroyed,
}

/// Work handed to the stepping thread
enum Command {
    CreateBody {
        /// Lets a timed-out waiter find and withdraw its request
        request: u64,
        def: BodyDef,
        shape: Shape,
        density: f32,
        reply: SyncSender<Result<BodyHandle>>,
    },
    AddLinearVelocity {
        handle: BodyHandle,
        delta: Vector2,
    },
}

struct State {
    run_state: RunState,

    commands: VecDeque<Command>,

    next_request: u64,

    /// Set while a step (including its listener call) runs
    stepping: bool,

    listener: Option<Box<dyn StepListener>>,

    /// Bumped whenever the listener is replaced or cleared
    listener_generation: u64,
}

struct Shared {
    state: Mutex<State>,

    /// Wakes the stepping thread on commands and state changes, and wakes
    /// `pause()` when a step finishes
    signal: Condvar,

    gravity: SharedGravity,

    destroyed: AtomicBool,

    snapshot: RwLock<Arc<WorldSnapshot>>,
}

/// Runs a [`PhysicsWorld`] on a dedicated thread at a fixed rate.
///
/// The world is moved onto the stepping thread at construction and never leaves
/// it. Every structural change (body creation, velocity changes) is queued as a
/// command and executed on that thread between steps. Render code reads body
/// transforms from the immutable [`WorldSnapshot`] republished after every step
/// and after every command batch.
///
/// A new controller starts [`RunState::Paused`]; call [`resume`] to start
/// stepping. All methods take `&self`, so the controller can be shared behind an
/// `Arc` between the scene, its gesture handlers and the orientation adapter.
///
/// After [`destroy`], `resume`, `pause`, `create_body` and `add_linear_velocity`
/// return [`PhysicsError::InvalidState`]; `set_gravity` and listener changes are
/// ignored.
///
/// [`resume`]: PhysicsController::resume
/// [`destroy`]: PhysicsController::destroy
pub struct PhysicsController {
    shared: Arc<Shared>,

    worker: Mutex<Option<JoinHandle<()>>>,

    step_thread: ThreadId,

    config: ControllerConfig,
}

impl PhysicsController {
    /// Creates a paused controller with the default simulation settings
    pub fn new() -> Result<Self> {
        Self::with_config(SimulationConfig::default(), ControllerConfig::default())
    }

    /// Creates a paused controller and spawns its stepping thread
    pub fn with_config(world_config: SimulationConfig, config: ControllerConfig) -> Result<Self> {
        let world = PhysicsWorld::with_config(world_config);

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                run_state: RunState::Paused,
                commands: VecDeque::new(),
                next_request: 0,
                stepping: false,
                listener: None,
                listener_generation: 0,
            }),
            signal: Condvar::new(),
            gravity: SharedGravity::new(world.get_gravity()),
            destroyed: AtomicBool::new(false),
            snapshot: RwLock::new(Arc::new(world.snapshot())),
        });

        let thread_shared = Arc::clone(&shared);
        let interval = config.step_interval;
        let worker = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run_step_loop(thread_shared, world, interval))
            .map_err(|e| PhysicsError::InternalError(format!("failed to spawn stepping thread: {}", e)))?;

        debug!("physics controller created, stepping every {:?}", interval);

        Ok(Self {
            shared,
            step_thread: worker.thread().id(),
            worker: Mutex::new(Some(worker)),
            config,
        })
    }

    /// The stepping thread configuration this controller was created with
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn run_state(&self) -> RunState {
        self.shared.state.lock().run_state
    }

    /// Starts or resumes stepping. Does nothing if already active.
    pub fn resume(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        match state.run_state {
            RunState::Destroyed => Err(destroyed_error("resume")),
            RunState::Active => Ok(()),
            RunState::Paused => {
                state.run_state = RunState::Active;
                self.shared.signal.notify_all();
                debug!("physics controller resumed");
                Ok(())
            }
        }
    }

    /// Stops stepping without discarding any state. Does nothing if already paused.
    ///
    /// Returns once any step in progress has finished, so no step runs after this
    /// returns. Called from the step listener it returns immediately and stepping
    /// stops after the current step.
    pub fn pause(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        match state.run_state {
            RunState::Destroyed => return Err(destroyed_error("pause")),
            RunState::Paused => return Ok(()),
            RunState::Active => {
                state.run_state = RunState::Paused;
                self.shared.signal.notify_all();
                debug!("physics controller paused");
            }
        }

        if !self.on_step_thread() {
            while state.stepping {
                self.shared.signal.wait(&mut state);
            }
        }
        Ok(())
    }

    /// Stops the loop for good, releases the world and clears the listener.
    ///
    /// Waits for the stepping thread to exit, so no listener call happens after
    /// this returns. Queued requests that were not dispatched yet fail with
    /// [`PhysicsError::InvalidState`]. Safe to call more than once.
    pub fn destroy(&self) {
        let listener = {
            let mut state = self.shared.state.lock();
            if state.run_state == RunState::Destroyed {
                return;
            }
            state.run_state = RunState::Destroyed;
            state.listener_generation += 1;
            self.shared.destroyed.store(true, Ordering::Release);
            self.shared.signal.notify_all();
            state.listener.take()
        };
        // Dropped outside the lock: the listener may own the last reference to
        // something that calls back into this controller
        drop(listener);

        if self.on_step_thread() {
            debug!("physics controller destroyed from the stepping thread");
            return;
        }

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                error!("physics stepping thread panicked");
            }
        }
        debug!("physics controller destroyed");
    }

    /// Queues the creation of a body on the stepping thread and returns a promise
    /// for its handle.
    ///
    /// Works while paused. Fails immediately once the controller is destroyed.
    pub fn request_body(&self, def: BodyDef, shape: Shape, density: f32) -> Result<PendingBody> {
        let (reply, receiver) = mpsc::sync_channel(1);
        let mut state = self.shared.state.lock();
        if state.run_state == RunState::Destroyed {
            return Err(destroyed_error("create a body"));
        }
        let request = state.next_request;
        state.next_request += 1;
        state.commands.push_back(Command::CreateBody {
            request,
            def,
            shape,
            density,
            reply,
        });
        self.shared.signal.notify_all();
        drop(state);

        Ok(PendingBody {
            shared: Arc::clone(&self.shared),
            request,
            receiver,
            result: None,
        })
    }

    /// Creates a body on the stepping thread and waits for its handle.
    ///
    /// When this returns `Ok`, the body is in the world and already present in
    /// [`snapshot`](PhysicsController::snapshot), and no step has seen it half
    /// built. Waits at most `handoff_timeout`; on timeout the request is withdrawn
    /// and no body is created.
    pub fn create_body(&self, def: BodyDef, shape: Shape, density: f32) -> Result<BodyHandle> {
        if self.on_step_thread() {
            return Err(PhysicsError::InvalidState(
                "create_body cannot wait on the stepping thread, use request_body".to_string(),
            ));
        }
        self.request_body(def, shape, density)?
            .wait(self.config.handoff_timeout)
    }

    /// Adds `delta` to a body's linear velocity before the next step
    pub fn add_linear_velocity(&self, handle: BodyHandle, delta: Vector2) -> Result<()> {
        self.enqueue("change a body's velocity", Command::AddLinearVelocity { handle, delta })
    }

    fn enqueue(&self, what: &str, command: Command) -> Result<()> {
        let mut state = self.shared.state.lock();
        if state.run_state == RunState::Destroyed {
            return Err(destroyed_error(what));
        }
        state.commands.push_back(command);
        self.shared.signal.notify_all();
        Ok(())
    }

    /// Replaces the gravity used from the next step on. Ignored after destroy.
    pub fn set_gravity(&self, gravity: Vector2) {
        if self.shared.destroyed.load(Ordering::Acquire) {
            trace!("ignoring gravity update {} after destroy", gravity);
            return;
        }
        self.shared.gravity.store(gravity);
    }

    pub fn gravity(&self) -> Vector2 {
        self.shared.gravity.load()
    }

    /// Registers the step listener, replacing any previous one
    pub fn set_step_listener<L>(&self, listener: L)
    where
        L: StepListener + 'static,
    {
        self.replace_listener(Some(Box::new(listener)));
    }

    pub fn clear_step_listener(&self) {
        self.replace_listener(None);
    }

    fn replace_listener(&self, listener: Option<Box<dyn StepListener>>) {
        let previous = {
            let mut state = self.shared.state.lock();
            if state.run_state == RunState::Destroyed {
                trace!("ignoring step listener change after destroy");
                return;
            }
            state.listener_generation += 1;
            std::mem::replace(&mut state.listener, listener)
        };
        drop(previous);
    }

    /// The most recently published snapshot
    pub fn snapshot(&self) -> Arc<WorldSnapshot> {
        let current = self.shared.snapshot.read();
        Arc::clone(&*current)
    }

    /// The latest published transform of a body
    pub fn transform(&self, handle: BodyHandle) -> Result<BodyTransform> {
        self.snapshot()
            .get(handle)
            .copied()
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))
    }

    /// Number of steps completed as of the latest snapshot
    pub fn step_count(&self) -> u64 {
        self.snapshot().step()
    }

    fn on_step_thread(&self) -> bool {
        thread::current().id() == self.step_thread
    }
}

impl Drop for PhysicsController {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn destroyed_error(what: &str) -> PhysicsError {
    PhysicsError::InvalidState(format!("cannot {} after the physics controller was destroyed", what))
}

/// A body creation handed to the stepping thread and not yet observed by the caller
pub struct PendingBody {
    shared: Arc<Shared>,

    request: u64,

    receiver: Receiver<Result<BodyHandle>>,

    result: Option<Result<BodyHandle>>,
}

impl PendingBody {
    /// Returns the outcome if the stepping thread has answered, without blocking
    pub fn try_get(&mut self) -> Option<Result<BodyHandle>> {
        if self.result.is_none() {
            self.result = match self.receiver.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Err(abandoned_error())),
            };
        }
        self.result.clone()
    }

    /// Blocks until the stepping thread answers or `timeout` expires.
    ///
    /// A request still queued at the timeout is withdrawn, so a
    /// [`PhysicsError::ConcurrencyTimeout`] always means no body was created. A
    /// request already dispatched is waited out and its outcome returned.
    pub fn wait(mut self, timeout: Duration) -> Result<BodyHandle> {
        if let Some(result) = self.result.take() {
            return result;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => self.withdraw(timeout),
            Err(RecvTimeoutError::Disconnected) => Err(abandoned_error()),
        }
    }

    fn withdraw(&self, timeout: Duration) -> Result<BodyHandle> {
        let mut state = self.shared.state.lock();
        let queued = state
            .commands
            .iter()
            .position(|command| matches!(command, Command::CreateBody { request, .. } if *request == self.request));

        if let Some(index) = queued {
            let withdrawn = state.commands.remove(index);
            drop(state);
            drop(withdrawn);
            debug!("body request {} withdrawn after {:?}", self.request, timeout);
            return Err(PhysicsError::ConcurrencyTimeout(timeout));
        }
        drop(state);

        // Dispatched in the current command batch, which replies without stepping
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(abandoned_error()),
        }
    }
}

impl fmt::Debug for PendingBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingBody")
            .field("request", &self.request)
            .field("result", &self.result)
            .finish()
    }
}

fn abandoned_error() -> PhysicsError {
    PhysicsError::InternalError("the stepping thread dropped the request without answering".to_string())
}

fn run_step_loop(shared: Arc<Shared>, mut world: PhysicsWorld, interval: Duration) {
    let mut next_tick: Option<Instant> = None;
    let mut state = shared.state.lock();

    loop {
        if state.run_state == RunState::Destroyed {
            let pending: Vec<Command> = state.commands.drain(..).collect();
            drop(state);
            reject_pending(pending);
            break;
        }

        if !state.commands.is_empty() {
            let batch: Vec<Command> = state.commands.drain(..).collect();
            MutexGuard::unlocked(&mut state, || execute_commands(&shared, &mut world, batch));
            continue;
        }

        if state.run_state == RunState::Paused {
            next_tick = None;
            shared.signal.wait(&mut state);
            continue;
        }

        let now = Instant::now();
        let deadline = *next_tick.get_or_insert(now + interval);
        if now < deadline {
            shared.signal.wait_until(&mut state, deadline);
            continue;
        }

        // Drop ticks rather than bursting to catch up
        let next = deadline + interval;
        next_tick = Some(if next <= now { now + interval } else { next });

        state.stepping = true;
        let generation = state.listener_generation;
        let listener = state.listener.take();
        let listener = MutexGuard::unlocked(&mut state, || step_once(&shared, &mut world, listener));
        state.stepping = false;

        let stale = if state.listener.is_none() && state.listener_generation == generation {
            state.listener = listener;
            None
        } else {
            listener
        };
        shared.signal.notify_all();
        if stale.is_some() {
            MutexGuard::unlocked(&mut state, || drop(stale));
        }
    }

    debug!(
        "physics stepping thread exiting after {} steps, releasing {} bodies",
        world.step_count(),
        world.body_count()
    );
}

fn execute_commands(shared: &Shared, world: &mut PhysicsWorld, batch: Vec<Command>) {
    let mut dirty = false;

    for command in batch {
        match command {
            Command::CreateBody {
                def,
                shape,
                density,
                reply,
                ..
            } => {
                let kind = shape.shape_type();
                let result = world.create_body(&def, shape, density);
                match &result {
                    Ok(handle) => {
                        debug!("created {:?} {} body {:?}", def.body_type, kind, handle);
                        // Visible to readers before the caller is woken
                        publish(shared, world);
                        dirty = false;
                    }
                    Err(err) => warn!("body creation failed: {}", err),
                }
                if reply.send(result).is_err() {
                    trace!("body creation finished after its requester went away");
                }
            }
            Command::AddLinearVelocity { handle, delta } => match world.add_linear_velocity(handle, delta) {
                Ok(()) => dirty = true,
                Err(err) => warn!("ignoring velocity change for {:?}: {}", handle, err),
            },
        }
    }

    if dirty {
        publish(shared, world);
    }
}

fn step_once(
    shared: &Shared,
    world: &mut PhysicsWorld,
    mut listener: Option<Box<dyn StepListener>>,
) -> Option<Box<dyn StepListener>> {
    world.set_gravity(shared.gravity.load());

    match panic::catch_unwind(AssertUnwindSafe(|| world.step())) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            error!("skipping physics step: {}", err);
            return listener;
        }
        Err(_) => {
            error!("physics step panicked, skipping it");
            return listener;
        }
    }

    let snapshot = publish(shared, world);
    trace!("step {} done, {} bodies", snapshot.step(), snapshot.len());

    if let Some(listener) = listener.as_mut() {
        if panic::catch_unwind(AssertUnwindSafe(|| listener.on_world_step(&snapshot))).is_err() {
            error!("step listener panicked");
        }
    }
    listener
}

fn publish(shared: &Shared, world: &PhysicsWorld) -> Arc<WorldSnapshot> {
    let snapshot = Arc::new(world.snapshot());
    *shared.snapshot.write() = Arc::clone(&snapshot);
    snapshot
}

fn reject_pending(pending: Vec<Command>) {
    for command in pending {
        if let Command::CreateBody { reply, .. } = command {
            let _ = reply.send(Err(PhysicsError::InvalidState(
                "physics controller destroyed before the request was dispatched".to_string(),
            )));
        }
    }
}
