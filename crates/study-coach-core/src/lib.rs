//! # Study Coach Core
//!
//! I/O-free logic for Study Coach: the plan data model, the error
//! taxonomy, the material store and generator abstractions, and the
//! pipeline stages that turn a learner's uploaded material into a
//! validated study plan.
//!
//! This crate contains no tokio runtime, HTTP client, or filesystem
//! access. Concrete backends (JSON file store, hosted chat-completions
//! client) live in the `study-coach` app crate.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌────────┐   ┌───────────┐   ┌───────────┐
//! │  Store   │──▶│  Context  │──▶│ Prompt │──▶│ Generator │──▶│  Extract  │
//! │ (owner)  │   │ (bounded) │   │ (pure) │   │ (remote)  │   │ +Validate │
//! └──────────┘   └───────────┘   └────────┘   └───────────┘   └───────────┘
//! ```
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Chunks, store state, plan types |
//! | [`request`] | Inbound request coercion and validation |
//! | [`store`] | Ownership-scoped material retrieval |
//! | [`context`] | Chunk selection and character budgeting |
//! | [`prompt`] | Plan prompt rendering |
//! | [`generation`] | Generator trait and test doubles |
//! | [`extract`] | Structured span extraction from generated text |
//! | [`validate`] | Plan diagnostics (numbering, quizzes, time budget) |
//! | [`pipeline`] | Orchestration and outbound response mapping |

pub mod context;
pub mod error;
pub mod extract;
pub mod generation;
mod lenient;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod request;
pub mod store;
pub mod validate;
