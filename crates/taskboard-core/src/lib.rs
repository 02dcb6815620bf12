//! Taskboard Core
//!
//! Everything the board client needs that is not rendering: the domain
//! model, the REST client, the optimistic reorder engine, card filtering
//! and the session. Nothing here touches the DOM, so it is tested natively.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod projection;
pub mod reorder;
pub mod session;

pub use api::{ApiClient, CardSink, StageSink};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, ErrorKind, ReorderError, ReorderResult};
pub use filter::{CardFilter, DueBucket, DueStatus};
pub use reorder::{DragResult, DropLocation, ReorderEngine};
pub use session::{MemoryTokenStore, Session, TokenStore};
