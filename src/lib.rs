//! taskpool - Worker-task pool that caches idle worker threads for reuse.
//!
//! This crate bounds the number of OS threads used to run user-supplied
//! callables and amortises thread-spawn cost by parking idle workers for
//! reuse. Workers left idle past a configurable horizon are reclaimed in
//! the background.
//!
//! # Features
//!
//! - **Two flavours**: [`Pool`] runs ad-hoc closures, [`PoolWithFunc`]
//!   runs typed arguments against a callable bound at construction
//! - **Bounded or unbounded**: fixed capacity with blocking or fail-fast
//!   saturation behaviour, or `-1` for no cap
//! - **Idle reclamation**: a background sweep retires workers idle past
//!   the expiry horizon
//! - **Panic isolation**: a panicking task takes down its worker, never
//!   the pool
//! - **Futures**: [`Pool::submit_with_result`] returns a [`TaskFuture`]
//!   with blocking, timed, and non-blocking observation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Pool                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐    ┌─────────┐    ┌─────────┐                  │
//! │  │ Worker1 │    │ Worker2 │    │ Worker3 │  ...             │
//! │  └────▲────┘    └────▲────┘    └────▲────┘                  │
//! │       │ inbox        │ inbox        │ inbox  (1 slot each)  │
//! │       │              │              │                       │
//! │  ┌────┴──────────────┴──────────────┴────┐   ┌───────────┐  │
//! │  │   idle store (LIFO stack / FIFO ring) │◄──┤  sweeper  │  │
//! │  └────────────────▲──────────────────────┘   └───────────┘  │
//! │                   │                                         │
//! │           ┌───────┴───────┐                                 │
//! │           │   submit()    │  (blocks or overloads when      │
//! │           └───────────────┘   saturated)                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use taskpool::{Options, Pool};
//!
//! let pool = Pool::with_options(
//!     10,
//!     Options::new().expiry_duration(Duration::from_secs(30)),
//! )?;
//!
//! pool.submit(|| expensive_work())?;
//!
//! let future = pool.submit_with_result(|| 21 * 2)?;
//! assert_eq!(future.get_with_timeout(Duration::from_secs(5))?, 42);
//!
//! pool.release();
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod future;
pub mod logger;
pub mod pool;
pub mod pool_func;

mod core;
mod store;
mod worker;

// Re-exports for convenience
pub use config::{Options, PanicHandler, DEFAULT_EXPIRY_DURATION};
pub use error::{PoolError, PoolResult};
pub use future::TaskFuture;
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use pool::Pool;
pub use pool_func::PoolWithFunc;
