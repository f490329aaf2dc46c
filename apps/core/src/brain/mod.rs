//! # Brain Module
//!
//! Rule-based reply engine for the CoderBrothers chat widget.
//!
//! ## Components
//! - `intent`: ordered keyword rules, first match wins
//! - `responses`: one canned handler per intent
//! - `dispatcher`: classify-then-respond pipeline
//! - `render`: text rendering of replies

pub mod dispatcher;
pub mod intent;
pub mod render;
pub mod responses;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use intent::{Classification, Intent, IntentClassifier, KeywordRule, DEFAULT_RULES};
pub use render::render_text;
pub use responses::{handler_for, respond, Fact, ResponsePayload, RichContent, Section};
