//! framebind-binding-core
//!
//! Binds view properties to continuous input. A binding couples one input
//! source (a pointer stream, scroll offsets, wall-clock time or a spring) with
//! expressions that are evaluated on every tick and written straight to the host
//! view, reporting only discrete lifecycle events (`start`, `end`, `cancel`,
//! `exit`, `interceptor`) upstream.
//!
//! ```text
//! host input ─▶ recognizer / driver ─▶ scope ─▶ exit ─▶ properties ─▶ interceptors
//!                                                 │          │              │
//!                                                 ▼          ▼              ▼
//!                                              callback  ViewUpdater     callback
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod registry;
pub mod scope;
pub mod token;

pub use crate::config::CoreConfig;
pub use crate::core::{BindingCore, HandlerFactory};
pub use crate::error::BindError;
pub use crate::handlers::{BindingLifecycle, EventHandler, HandlerContext};
pub use crate::pipeline::{BindingPipeline, Outputs, TickOutcome};
pub use crate::registry::{BindingRegistry, RegistryEntry};
pub use crate::token::Token;
