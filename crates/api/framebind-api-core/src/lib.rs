//! framebind-api-core: values, expressions and host capabilities shared by every framebind crate.
//!
//! Nothing in here runs per frame on its own. The types describe what a binding
//! reads (`Scope`, `ExpressionPair`), what it writes (`ViewUpdater`), and what it
//! reports upstream (`EventPayload`).

pub mod coercion;
pub mod evaluator;
pub mod event;
pub mod expression;
pub mod json;
pub mod kind;
pub mod platform;
pub mod scope;
pub mod value;

pub use evaluator::JsonAstEvaluator;
pub use event::{EventCallback, EventPayload, EventState};
pub use expression::{EvalError, ExpressionEvaluator, ExpressionHolder, ExpressionPair};
pub use json::{BindingRequest, RequestError};
pub use kind::EventKind;
pub use platform::{
    IdentityTranslator, Platform, ResolutionTranslator, UpdateContext, ViewFinder, ViewHandle,
    ViewUpdater,
};
pub use scope::Scope;
pub use value::{Value, ValueKind};
