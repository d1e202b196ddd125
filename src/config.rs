//! Pool configuration.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use crate::logger::{default_logger, Logger};

/// Default idle horizon after which a worker is reclaimed.
pub const DEFAULT_EXPIRY_DURATION: Duration = Duration::from_secs(10);

/// Callback receiving the payload of a panic captured inside a worker.
pub type PanicHandler = Arc<dyn Fn(Box<dyn Any + Send>) + Send + Sync>;

/// Configuration consumed at pool construction.
///
/// All fields have usable defaults; the chainable setters allow building a
/// configuration inline:
///
/// ```rust,ignore
/// use std::time::Duration;
/// use taskpool::{Options, Pool};
///
/// let pool = Pool::with_options(
///     10,
///     Options::new()
///         .expiry_duration(Duration::from_secs(30))
///         .nonblocking(true),
/// )?;
/// ```
pub struct Options {
    /// Idle horizon: a worker idle longer than this is reclaimed by the
    /// background sweep, which also ticks at this interval.
    pub expiry_duration: Duration,

    /// Allocate the stack store's backing vector at capacity up front.
    /// Only meaningful for bounded pools that select the stack store.
    pub pre_alloc: bool,

    /// Reserved; not enforced.
    pub max_blocking_tasks: usize,

    /// When true, submission to a saturated pool fails immediately with
    /// [`PoolError::Overload`](crate::PoolError::Overload) instead of
    /// blocking until a worker frees up.
    pub nonblocking: bool,

    /// Invoked with the captured payload when a task panics. When unset,
    /// the panic is reported through `logger` instead.
    pub panic_handler: Option<PanicHandler>,

    /// Target for worker-reclamation and panic lines.
    pub logger: Arc<dyn Logger>,

    /// Name used for worker/sweeper thread names and log fields.
    pub name: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            expiry_duration: DEFAULT_EXPIRY_DURATION,
            pre_alloc: false,
            max_blocking_tasks: 0,
            nonblocking: false,
            panic_handler: None,
            logger: default_logger(),
            name: "taskpool".to_string(),
        }
    }
}

impl Options {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the idle horizon (and sweep interval).
    pub fn expiry_duration(mut self, duration: Duration) -> Self {
        self.expiry_duration = duration;
        self
    }

    /// Pre-allocate the stack store at capacity.
    pub fn pre_alloc(mut self, pre_alloc: bool) -> Self {
        self.pre_alloc = pre_alloc;
        self
    }

    /// Reserved; retained for configuration compatibility, not enforced.
    pub fn max_blocking_tasks(mut self, max: usize) -> Self {
        self.max_blocking_tasks = max;
        self
    }

    /// Fail fast with `Overload` instead of blocking when saturated.
    pub fn nonblocking(mut self, nonblocking: bool) -> Self {
        self.nonblocking = nonblocking;
        self
    }

    /// Install a callback for panics captured inside workers.
    pub fn panic_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Box<dyn Any + Send>) + Send + Sync + 'static,
    {
        self.panic_handler = Some(Arc::new(handler));
        self
    }

    /// Install a logger for the pool's facade lines.
    pub fn logger<L: Logger + 'static>(mut self, logger: L) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Name the pool; worker threads are named `{name}-worker-{n}`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
