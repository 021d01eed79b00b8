//! # Study Coach
//!
//! Generates time-boxed, Pomodoro-style study plans from a learner's
//! uploaded material using a hosted text-generation service.
//!
//! Ingestion (parsing, chunking, embedding uploads) happens elsewhere and
//! leaves a JSON material store on disk. This crate reads the caller's
//! chunks from that store, bounds them into a prompt, asks the generation
//! service for a plan, and returns the validated plan over a CLI or an
//! HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────┐   ┌──────────────┐
//! │  JSON store  │──▶│   StudyCoach (core) │──▶│  Chat API    │
//! │ (ingested)   │   │ context+prompt+check│◀──│ Mistral/OAI  │
//! └──────────────┘   └──────────┬──────────┘   └──────────────┘
//!                               │
//!                     ┌─────────┴─────────┐
//!                     ▼                   ▼
//!                ┌──────────┐       ┌──────────┐
//!                │   CLI    │       │   HTTP   │
//!                │ (coach)  │       │  (axum)  │
//!                └──────────┘       └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`json_store`] | JSON-file material store |
//! | [`generation`] | Chat-completions generation client |
//! | [`coach`] | Wiring config into a [`StudyCoach`](study_coach_core::pipeline::StudyCoach) |
//! | [`plan_cmd`] | `coach plan` / `coach materials` commands |
//! | [`server`] | HTTP server |

pub mod coach;
pub mod config;
pub mod generation;
pub mod json_store;
pub mod plan_cmd;
pub mod server;
