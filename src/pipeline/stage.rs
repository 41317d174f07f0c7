// src/pipeline/stage.rs

//! The stage framework shared by [`Initiator`], [`Processor`], and
//! [`Terminator`].
//!
//! Each stage moves through the states
//!
//! ```text
//! Idle → Active → Stopping → Stopped
//! ```
//!
//! `start()` validates the stage collaborators, marks the stage `Active`,
//! and spawns one named worker thread. The worker runs until it forwards
//! the end of the stream or until a stage-fatal error. Either way the
//! stage then becomes `Stopping`, calls each end-of-stream listener once,
//! and becomes `Stopped`.
//!
//! A stage-fatal error is any error returned by the worker body or any
//! panic within it. It is printed, then an `EndOfStream` is offered to the
//! downstream queue without blocking so the following stages also stop.
//!
//! [`Initiator`]: crate::pipeline::initiator::Initiator
//! [`Processor`]: crate::pipeline::processor::Processor
//! [`Terminator`]: crate::pipeline::terminator::Terminator

use crate::data::event::Event;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::pipeline::processor::TransformError;
use crate::pipeline::queue::EventSender;
use crate::readers::lineconverter::ConverterError;

use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::si_trace_print::stack::stack_offset_set;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StageState, StageError, StageFault
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Lifecycle state of a stage.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageState {
    /// Created, not yet started.
    Idle,
    /// The worker thread is running.
    Active,
    /// The worker finished; listeners are being called.
    Stopping,
    /// Done.
    Stopped,
}

/// A stage could not be started or joined. Raised synchronously to the
/// caller of `start()` or `join()`.
#[derive(Debug)]
pub enum StageError {
    /// The named stage is missing a required collaborator.
    MissingCollaborator(String, &'static str),
    /// The worker thread of the named stage could not be spawned.
    Spawn(String, io::Error),
    /// The worker thread of the named stage panicked outside of the stage
    /// boundary.
    Join(String),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StageError::MissingCollaborator(name, what) => {
                write!(f, "stage {:?} cannot start without a {}", name, what)
            }
            StageError::Spawn(name, err) => write!(f, "stage {:?} failed to spawn a thread: {}", name, err),
            StageError::Join(name) => write!(f, "stage {:?} thread panicked", name),
        }
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StageError::Spawn(_, err) => Some(err),
            _ => None,
        }
    }
}

/// A stage-fatal error within a worker thread.
#[derive(Debug)]
pub enum StageFault {
    /// Reading the byte source failed.
    Source(io::Error),
    /// The line converter was misused.
    Converter(ConverterError),
    /// A transform failed.
    Transform(TransformError),
    /// A sink failed.
    Sink(io::Error),
    /// The downstream queue has no receiver.
    Disconnected,
    /// The worker body panicked.
    Panic(String),
}

impl fmt::Display for StageFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StageFault::Source(err) => write!(f, "source read failed: {}", err),
            StageFault::Converter(err) => write!(f, "{}", err),
            StageFault::Transform(err) => write!(f, "transform failed: {}", err),
            StageFault::Sink(err) => write!(f, "sink failed: {}", err),
            StageFault::Disconnected => write!(f, "downstream queue is disconnected"),
            StageFault::Panic(message) => write!(f, "panicked: {}", message),
        }
    }
}

impl std::error::Error for StageFault {}

/// Result of a worker body.
pub type ResultWorker = Result<(), StageFault>;

/// A callback invoked once when a stage stops.
pub type Listener = Box<dyn FnOnce() + Send + 'static>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stage trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The lifecycle common to all pipeline stages.
pub trait Stage {
    fn name(&self) -> &str;

    fn state(&self) -> StageState;

    /// Validate collaborators and spawn the worker thread.
    ///
    /// Calling `start` on a stage that is not `Idle` does nothing.
    fn start(&mut self) -> Result<(), StageError>;

    /// Register `listener` to be called once after the stage forwarded the
    /// end of the stream, or failed. If the stage already stopped then
    /// `listener` is called immediately.
    fn on_end_of_stream(
        &mut self,
        listener: Listener,
    );

    /// Wait for the worker thread to finish. Does nothing if the worker
    /// was never spawned or was already joined.
    fn join(&mut self) -> Result<(), StageError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StageCore
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
struct Listeners {
    listeners: Vec<Listener>,
    /// The listeners were called; later listeners are called immediately.
    fired: bool,
}

/// State shared by a stage and its worker thread.
struct StageShared {
    state: RwLock<StageState>,
    listeners: Mutex<Listeners>,
}

/// Thread-safe [Atomic Reference Counting pointer] to a [`StageShared`].
///
/// [Atomic Reference Counting pointer]: std::sync::Arc
type StageSharedP = Arc<StageShared>;

impl StageShared {
    fn state(&self) -> StageState {
        *self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(
        &self,
        state: StageState,
    ) {
        *self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Move to `Stopping`, call the listeners, move to `Stopped`.
    fn stop(&self) {
        self.set_state(StageState::Stopping);
        let listeners: Vec<Listener> = {
            let mut guard = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            guard.fired = true;
            std::mem::take(&mut guard.listeners)
        };
        defo!("call {} listeners", listeners.len());
        for listener in listeners.into_iter() {
            listener();
        }
        self.set_state(StageState::Stopped);
    }
}

/// The name, state, listeners, and worker thread of one stage.
/// Each stage kind owns one `StageCore` and delegates its [`Stage`]
/// lifecycle to it.
pub struct StageCore {
    name: String,
    shared: StageSharedP,
    handle: Option<thread::JoinHandle<()>>,
}

impl fmt::Debug for StageCore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StageCore")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("spawned", &self.handle.is_some())
            .finish()
    }
}

impl StageCore {
    pub fn new(name: impl Into<String>) -> StageCore {
        StageCore {
            name: name.into(),
            shared: Arc::new(StageShared {
                state: RwLock::new(StageState::Idle),
                listeners: Mutex::new(Listeners::default()),
            }),
            handle: None,
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn state(&self) -> StageState {
        self.shared.state()
    }

    #[inline(always)]
    pub fn is_idle(&self) -> bool {
        self.state() == StageState::Idle
    }

    /// Error for a missing collaborator `what`.
    pub fn missing(
        &self,
        what: &'static str,
    ) -> StageError {
        StageError::MissingCollaborator(self.name.clone(), what)
    }

    pub fn on_end_of_stream(
        &mut self,
        listener: Listener,
    ) {
        let mut guard = self
            .shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if guard.fired {
            drop(guard);
            defo!("stage {:?} already stopped, call listener now", self.name);
            listener();
            return;
        }
        guard.listeners.push(listener);
    }

    /// Mark the stage `Active` and spawn the worker thread running `body`.
    ///
    /// `downstream` is the queue offered an `EndOfStream` if `body` fails.
    pub fn spawn<F>(
        &mut self,
        downstream: Option<EventSender>,
        body: F,
    ) -> Result<(), StageError>
    where
        F: FnOnce() -> ResultWorker + Send + 'static,
    {
        defn!("stage {:?}", self.name);
        self.shared.set_state(StageState::Active);
        let name: String = self.name.clone();
        let shared: StageSharedP = self.shared.clone();
        match thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || exec_worker(name, shared, downstream, body))
        {
            Ok(handle) => {
                self.handle = Some(handle);
                defx!("spawned");
                Ok(())
            }
            Err(err) => {
                e_err!("thread.name({:?}).spawn() failed {:?}", self.name, err);
                self.shared.stop();
                defx!("spawn failed");
                Err(StageError::Spawn(self.name.clone(), err))
            }
        }
    }

    pub fn join(&mut self) -> Result<(), StageError> {
        let handle = match self.handle.take() {
            Some(val) => val,
            None => return Ok(()),
        };
        defñ!("join stage {:?}", self.name);
        match handle.join() {
            Ok(_) => Ok(()),
            Err(_) => Err(StageError::Join(self.name.clone())),
        }
    }
}

/// The message of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return s.to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }

    String::from("unknown panic")
}

/// Thread entry point of every stage worker.
fn exec_worker<F>(
    name: String,
    shared: StageSharedP,
    downstream: Option<EventSender>,
    body: F,
) where
    F: FnOnce() -> ResultWorker,
{
    if cfg!(debug_assertions) {
        stack_offset_set(Some(2));
    }
    defn!("stage {:?}", name);

    let result: ResultWorker = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(val) => val,
        Err(payload) => Err(StageFault::Panic(panic_message(payload.as_ref()))),
    };
    if let Err(fault) = result {
        e_err!("stage {:?} {}", name, fault);
        if let Some(sender) = downstream.as_ref() {
            match sender.try_send(Event::EndOfStream) {
                Ok(_) => {
                    defo!("offered EndOfStream downstream");
                }
                Err(err) => {
                    e_wrn!("stage {:?} failed to offer EndOfStream downstream: {}", name, err);
                }
            }
        }
    }
    drop(downstream);
    shared.stop();

    defx!("stage {:?}", name);
}

/// Send `event` downstream, blocking while the queue is full.
pub fn send(
    sender: &EventSender,
    event: Event,
) -> ResultWorker {
    match sender.send(event) {
        Ok(_) => Ok(()),
        Err(_err) => {
            de_wrn!("send failed {}", _err);
            Err(StageFault::Disconnected)
        }
    }
}
