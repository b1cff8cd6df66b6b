//! # TQS Rust Client
//!
//! A Rust client library for TQS, a lease-based message queue service exposed
//! over HTTP/JSON.
//!
//! A message moves through the service as
//! `delayed → visible → leased → deleted`, returning to `visible` if its
//! lease runs out before it is deleted. This crate does not make any of those
//! decisions itself; it speaks the service's REST protocol and maps each
//! response onto a matchable [`TqsError`] variant so callers can tell an
//! empty queue from a missing one, or an expired lease from a transport
//! failure.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tqs_client::{GetOptions, Queue, TqsError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = Queue::new("http://localhost:8080", "jobs")?;
//!
//!     if !queue.exists().await? {
//!         queue.create().await?;
//!     }
//!
//!     queue.put("Hello, TQS!", "text/plain").await?;
//!
//!     match queue.get(&GetOptions::default()).await {
//!         Ok(message) => {
//!             println!("Leased {}: {}", message.lease_uuid, message.body);
//!             // Acknowledge once processed
//!             message.delete().await?;
//!         }
//!         Err(TqsError::QueueEmpty { .. }) => println!("Nothing to do"),
//!         Err(e) => return Err(e.into()),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Async/await support** - Built on Tokio and `reqwest`
//! - **Lease handles** - [`Message::delete`] releases the lease it was leased with
//! - **Long-poll and delete-on-read** - Via [`GetOptions`]
//! - **Typed bodies** - [`Queue::get_value`] decodes JSON bodies with `serde`
//! - **Opt-in retry** - Exponential backoff for transport failures on get
//! - **Structured logging** - Request outcomes are emitted through `tracing`
//!
//! ## Timeouts
//!
//! Create, statistics and lease deletion are bounded by
//! [`Config::admin_timeout`] (2 seconds by default). Put and get carry no
//! client-side timeout, because a get with [`GetOptions::wait`] is expected
//! to block for up to the requested duration.
//!
//! ## Configuration
//!
//! Use [`ConfigBuilder`] for authentication and tuning:
//!
//! ```no_run
//! use tqs_client::{ConfigBuilder, Queue};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), tqs_client::TqsError> {
//! let queue = Queue::with_config(
//!     ConfigBuilder::new()
//!         .endpoint("https://queues.example.com")
//!         .token("secret-token")
//!         .admin_timeout(Duration::from_secs(5))
//!         .reuse_connections(true)
//!         .max_retries(5)
//!         .retry_delay(Duration::from_millis(200))
//!         .build(),
//!     "jobs",
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod message;
pub mod queue;
mod retry;

pub use config::{Config, ConfigBuilder};
pub use error::{Result, TqsError};
pub use message::Message;
pub use queue::{GetOptions, Queue, QueueStatistics};
