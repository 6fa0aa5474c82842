//! The fixed-rate scheduler.
//!
//! Each activation of the [`Runner`] performs, strictly in order:
//!
//! 1. **TICK**: every [`TickObserver`] advances (the world first)
//! 2. **DISPATCH**: the [`CommandQueue`] is drained and each command is handed
//!    to every [`CommandConsumer`] in registration order (the world first)
//! 3. **RENDER**: the [`Renderer`] receives one [`Frame`](crate::observer::Frame)
//!
//! A `Quit` command is dispatched to every consumer and the renderer is shut
//! down, after which the runner stops; commands queued behind it are
//! discarded.
//!
//! # Failure
//!
//! Any [`EngineError`] raised during an activation is fatal. The runner logs
//! it, clears the queue, dispatches a single `Quit` and shuts the renderer
//! down so everything can release resources, and stops. [`Runner::step`] then returns that error.
//!
//! # Threading
//!
//! [`Runner::step`] runs one activation on the caller's thread.
//! [`Runner::start`] moves the runner onto a dedicated scheduler thread that
//! calls `step` at `target_tps` and hands back a [`RunnerHandle`].
//!
//! # Example
//!
//! ```
//! use mday_core::command::Command;
//! use mday_core::config::EngineConfig;
//! use mday_core::observer::NullRenderer;
//! use mday_core::runner::{Runner, StepOutcome};
//!
//! let mut runner = Runner::new(&EngineConfig::default(), NullRenderer);
//! let queue = runner.queue();
//!
//! queue.push(Command::ZoomIn(None));
//! assert_eq!(runner.step().unwrap(), StepOutcome::Continue);
//!
//! queue.push(Command::Quit);
//! assert_eq!(runner.step().unwrap(), StepOutcome::Quit);
//! assert!(runner.is_stopped());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::command::{Command, CommandQueue};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::observer::{CommandConsumer, Renderer, TickObserver};
use crate::world::World;

/// Name of the scheduler thread.
pub const SCHEDULER_THREAD_NAME: &str = "mday-scheduler";

/// Result of one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Keep scheduling.
    Continue,
    /// `Quit` was dispatched; the runner has stopped.
    Quit,
}

// =============================================================================
// Runner
// =============================================================================

/// Drives the world, extra collaborators and the renderer one activation at a
/// time.
pub struct Runner<R> {
    world: World,
    renderer: R,
    observers: Vec<Box<dyn TickObserver + Send>>,
    consumers: Vec<Box<dyn CommandConsumer + Send>>,
    queue: CommandQueue,
    tick_period: Duration,
    ticks: u64,
    stopped: bool,
}

impl<R> fmt::Debug for Runner<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("world", &self.world)
            .field("observers", &format!("[{} observers]", self.observers.len()))
            .field("consumers", &format!("[{} consumers]", self.consumers.len()))
            .field("queue", &self.queue)
            .field("tick_period", &self.tick_period)
            .field("ticks", &self.ticks)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl<R: Renderer> Runner<R> {
    /// Creates a runner over an empty world. The queue starts with a single
    /// [`Command::Start`].
    #[must_use]
    pub fn new(config: &EngineConfig, renderer: R) -> Self {
        Self::with_world(World::with_config(config), config, renderer)
    }

    /// Creates a runner over an existing world.
    #[must_use]
    pub fn with_world(world: World, config: &EngineConfig, renderer: R) -> Self {
        Self {
            world,
            renderer,
            observers: Vec::new(),
            consumers: Vec::new(),
            queue: CommandQueue::seeded(),
            tick_period: config.tick_period(),
            ticks: 0,
            stopped: false,
        }
    }

    /// Registers an extra per-tick observer, run after the world.
    #[must_use]
    pub fn with_observer(mut self, observer: impl TickObserver + Send + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Registers an extra command consumer, run after the world.
    #[must_use]
    pub fn with_consumer(mut self, consumer: impl CommandConsumer + Send + 'static) -> Self {
        self.consumers.push(Box::new(consumer));
        self
    }

    /// A producer handle to the command queue.
    #[must_use]
    pub fn queue(&self) -> CommandQueue {
        self.queue.clone()
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for setup before scheduling starts.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Completed activations.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether the runner has stopped, by `Quit` or by a fatal error.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Runs one activation.
    ///
    /// A stopped runner does nothing and reports [`StepOutcome::Quit`].
    ///
    /// # Errors
    ///
    /// Returns the first [`EngineError`] raised by an observer, consumer or
    /// the renderer, after the shutdown sequence has run.
    pub fn step(&mut self) -> Result<StepOutcome, EngineError> {
        if self.stopped {
            return Ok(StepOutcome::Quit);
        }
        match self.activate() {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.shutdown(&err);
                Err(err)
            }
        }
    }

    fn activate(&mut self) -> Result<StepOutcome, EngineError> {
        self.world.tick()?;
        for observer in &mut self.observers {
            observer.tick()?;
        }

        let mut commands = self.queue.drain();
        while let Some(command) = commands.pop_front() {
            self.dispatch(&command)?;
            if command.is_quit() {
                if !commands.is_empty() {
                    debug!(discarded = commands.len(), "commands after quit discarded");
                }
                info!(ticks = self.ticks, "quit received");
                self.release_renderer();
                self.stopped = true;
                return Ok(StepOutcome::Quit);
            }
        }

        self.renderer.render(&self.world.frame(self.ticks))?;
        self.ticks += 1;
        Ok(StepOutcome::Continue)
    }

    fn dispatch(&mut self, command: &Command) -> Result<(), EngineError> {
        debug!(command = %command, "dispatching");
        self.world.accept(command)?;
        for consumer in &mut self.consumers {
            consumer.accept(command)?;
        }
        Ok(())
    }

    /// Clears the queue, lets every consumer see one `Quit`, and stops.
    fn shutdown(&mut self, cause: &EngineError) {
        error!(error = %cause, ticks = self.ticks, "tick failed, shutting down");
        self.queue.clear();

        let quit = Command::Quit;
        if let Err(err) = self.world.accept(&quit) {
            warn!(error = %err, consumer = self.world.name(), "consumer failed during shutdown");
        }
        for consumer in &mut self.consumers {
            if let Err(err) = consumer.accept(&quit) {
                warn!(error = %err, consumer = consumer.name(), "consumer failed during shutdown");
            }
        }
        self.release_renderer();
        self.stopped = true;
    }

    fn release_renderer(&mut self) {
        if let Err(err) = self.renderer.shutdown() {
            warn!(error = %err, "renderer failed during shutdown");
        }
    }
}

impl<R: Renderer + Send + 'static> Runner<R> {
    /// Moves the runner onto the scheduler thread.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Spawn`] if the thread could not be created.
    pub fn start(self) -> Result<RunnerHandle<R>, EngineError> {
        let queue = self.queue.clone();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let period = self.tick_period;

        let thread = thread::Builder::new()
            .name(SCHEDULER_THREAD_NAME.into())
            .spawn(move || self.run(&flag))
            .map_err(EngineError::Spawn)?;

        info!(?period, "scheduler started");
        Ok(RunnerHandle {
            queue,
            running,
            thread,
        })
    }

    fn run(mut self, running: &AtomicBool) -> Result<Self, EngineError> {
        let period = self.tick_period;
        let mut next_tick = Instant::now();

        while running.load(Ordering::Acquire) {
            if self.step()? == StepOutcome::Quit {
                break;
            }

            next_tick += period;
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            } else if now - next_tick > period * 2 {
                // Too far behind; drop the backlog instead of bursting.
                next_tick = now;
            }
        }

        info!(ticks = self.ticks, "scheduler stopped");
        Ok(self)
    }
}

// =============================================================================
// Runner Handle
// =============================================================================

/// Handle to a runner on its scheduler thread.
#[derive(Debug)]
pub struct RunnerHandle<R> {
    queue: CommandQueue,
    running: Arc<AtomicBool>,
    thread: JoinHandle<Result<Runner<R>, EngineError>>,
}

impl<R> RunnerHandle<R> {
    /// Producer handle to the runner's command queue.
    #[must_use]
    pub const fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Whether the scheduler thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Asks the scheduler to exit after the current activation, then waits
    /// for it.
    ///
    /// # Errors
    ///
    /// As [`RunnerHandle::join`].
    pub fn stop(self) -> Result<Runner<R>, EngineError> {
        self.running.store(false, Ordering::Release);
        self.join()
    }

    /// Waits for the scheduler thread to exit and returns the runner.
    ///
    /// # Errors
    ///
    /// Returns the fatal error that stopped the scheduler, or
    /// [`EngineError::SchedulerPanicked`] if the thread panicked.
    pub fn join(self) -> Result<Runner<R>, EngineError> {
        self.thread
            .join()
            .map_err(|_| EngineError::SchedulerPanicked)?
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::observer::{Frame, NullRenderer};
    use crate::unit::{Unit, UnitType};
    use std::sync::Mutex;

    /// Records every command it sees.
    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<Command>>>,
    }

    impl CommandConsumer for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn accept(&mut self, command: &Command) -> Result<(), EngineError> {
            self.seen.lock().unwrap().push(command.clone());
            Ok(())
        }
    }

    /// Fails on the first `Deselect`.
    struct Faulty;

    impl CommandConsumer for Faulty {
        fn accept(&mut self, command: &Command) -> Result<(), EngineError> {
            match command {
                Command::Deselect => Err(EngineError::consumer("faulty", "boom")),
                _ => Ok(()),
            }
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        frames: u64,
        visible: usize,
        shutdowns: u32,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, frame: &Frame<'_>) -> Result<(), EngineError> {
            self.frames += 1;
            self.visible = frame.visible().count();
            Ok(())
        }

        fn shutdown(&mut self) -> Result<(), EngineError> {
            self.shutdowns += 1;
            Ok(())
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn first_step_dispatches_start() {
            let recorder = Recorder::default();
            let mut runner =
                Runner::new(&EngineConfig::default(), NullRenderer).with_consumer(recorder.clone());

            runner.step().unwrap();
            assert_eq!(*recorder.seen.lock().unwrap(), vec![Command::Start]);
            assert_eq!(runner.ticks(), 1);
        }

        #[test]
        fn commands_dispatched_in_fifo_order_then_rendered() {
            let recorder = Recorder::default();
            let mut runner = Runner::new(&EngineConfig::default(), CountingRenderer::default())
                .with_consumer(recorder.clone());
            let queue = runner.queue();
            queue.push(Command::AddUnit(Unit::new(
                "sun",
                UnitType::Star,
                Location::ORIGIN,
            )));
            queue.push(Command::PanLeft);

            runner.step().unwrap();

            let seen = recorder.seen.lock().unwrap().clone();
            assert_eq!(seen.len(), 3);
            assert_eq!(seen[2], Command::PanLeft);
            assert_eq!(runner.world().units().len(), 1);
            assert_eq!(runner.renderer().frames, 1);
            assert_eq!(runner.renderer().visible, 1);
        }

        #[test]
        fn quit_stops_and_discards_rest() {
            let recorder = Recorder::default();
            let mut runner =
                Runner::new(&EngineConfig::default(), NullRenderer).with_consumer(recorder.clone());
            let queue = runner.queue();
            queue.push(Command::Quit);
            queue.push(Command::PanUp);

            assert_eq!(runner.step().unwrap(), StepOutcome::Quit);
            assert!(runner.is_stopped());
            assert_eq!(
                *recorder.seen.lock().unwrap(),
                vec![Command::Start, Command::Quit]
            );
            assert_eq!(runner.step().unwrap(), StepOutcome::Quit);
        }

        #[test]
        fn consumer_failure_runs_shutdown_sequence() {
            let recorder = Recorder::default();
            let mut runner = Runner::new(&EngineConfig::default(), NullRenderer)
                .with_consumer(Faulty)
                .with_consumer(recorder.clone());
            let queue = runner.queue();
            queue.push(Command::Deselect);
            queue.push(Command::PanUp);

            let err = runner.step().unwrap_err();
            assert!(matches!(err, EngineError::Consumer { .. }));
            assert!(runner.is_stopped());
            assert!(queue.is_empty());
            assert_eq!(
                *recorder.seen.lock().unwrap(),
                vec![Command::Start, Command::Quit]
            );
        }

        #[test]
        fn quit_shuts_renderer_down_once() {
            let mut runner = Runner::new(&EngineConfig::default(), CountingRenderer::default());
            runner.step().unwrap();
            assert_eq!(runner.renderer().shutdowns, 0);

            runner.queue().push(Command::Quit);
            assert_eq!(runner.step().unwrap(), StepOutcome::Quit);
            assert_eq!(runner.step().unwrap(), StepOutcome::Quit);
            assert_eq!(runner.renderer().shutdowns, 1);
            assert_eq!(runner.renderer().frames, 1);
        }

        #[test]
        fn fatal_error_shuts_renderer_down() {
            let mut runner = Runner::new(&EngineConfig::default(), CountingRenderer::default())
                .with_consumer(Faulty);
            runner.queue().push(Command::Deselect);

            assert!(runner.step().is_err());
            assert_eq!(runner.renderer().shutdowns, 1);
            assert_eq!(runner.renderer().frames, 0);
        }

        #[test]
        fn renderer_shutdown_failure_is_logged_not_raised() {
            struct Sticky;
            impl Renderer for Sticky {
                fn render(&mut self, _frame: &Frame<'_>) -> Result<(), EngineError> {
                    Ok(())
                }
                fn shutdown(&mut self) -> Result<(), EngineError> {
                    Err(EngineError::Render("surface busy".into()))
                }
            }

            let mut runner = Runner::new(&EngineConfig::default(), Sticky);
            runner.queue().push(Command::Quit);
            assert_eq!(runner.step().unwrap(), StepOutcome::Quit);
            assert!(runner.is_stopped());
        }

        #[test]
        fn render_failure_is_fatal() {
            struct Broken;
            impl Renderer for Broken {
                fn render(&mut self, _frame: &Frame<'_>) -> Result<(), EngineError> {
                    Err(EngineError::Render("surface lost".into()))
                }
            }

            let mut runner = Runner::new(&EngineConfig::default(), Broken);
            assert!(matches!(runner.step(), Err(EngineError::Render(_))));
            assert!(runner.is_stopped());
        }
    }

    mod thread_tests {
        use super::*;

        #[test]
        fn quit_from_producer_stops_scheduler() {
            let config = EngineConfig {
                target_tps: 500,
                ..EngineConfig::default()
            };
            let handle = Runner::new(&config, NullRenderer).start().unwrap();
            handle.queue().push(Command::ZoomIn(None));
            handle.queue().push(Command::Quit);

            let runner = handle.join().unwrap();
            assert!(runner.is_stopped());
            assert_eq!(runner.world().view().scale_goal(), 1.5);
        }

        #[test]
        fn stop_returns_runner() {
            let config = EngineConfig {
                target_tps: 500,
                ..EngineConfig::default()
            };
            let handle = Runner::new(&config, NullRenderer).start().unwrap();
            thread::sleep(Duration::from_millis(50));
            let runner = handle.stop().unwrap();
            assert!(runner.ticks() > 0);
            assert!(!runner.is_stopped());
        }
    }
}
