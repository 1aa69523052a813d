//! lexbox: a compile-and-run web service for Lex programs
//!
//! Receives a Lex grammar (and optional stdin text) over HTTP, drives the
//! host `flex`/`gcc` toolchain inside an isolated scratch workspace, runs
//! the built scanner, and returns captured output with failures tagged by
//! pipeline stage.
//!
//! # Architecture
//!
//! ## Workspace lifecycle ([`workspace`])
//! - [`workspace::WorkspaceManager`]: per-request UUID directories under a
//!   process-wide scratch root, plus the age-based sweep
//! - [`workspace::Workspace`]: one request's artifacts; best-effort,
//!   idempotent teardown
//!
//! ## Pipeline ([`pipeline`])
//! - [`pipeline::toolchain`]: platform table and pure argv builders
//! - [`pipeline::process`]: bounded subprocess execution with forced kill
//! - [`pipeline::run`]: the strictly sequential generate → compile →
//!   execute driver
//!
//! ## HTTP surface ([`server`])
//! - `POST /compile` and `GET /health`; transport success is decoupled from
//!   compile success
//!
//! ## Configuration ([`config`])
//! - process-scoped settings resolved at startup; fixed stage-timeout and
//!   sweep constants
//!
//! # Design principles
//!
//! 1. **One request, one workspace** - no shared mutable state between runs
//! 2. **Stages are structural** - failures are tagged by where the runner
//!    was, never guessed from command text
//! 3. **Commands are data** - argv construction is pure and testable
//!    without a toolchain
//! 4. **Teardown always runs** - explicitly per request, on drop as a
//!    backstop, and by sweep for anything left behind

// HTTP endpoint layer and background sweep
pub mod server;

// Three-stage compile pipeline
pub mod pipeline;

// Run-scoped workspace artifacts
pub mod workspace;

// Configuration and fixed pipeline constants
pub mod config;

// Shared wire types and error taxonomy
pub mod types;

// CLI entrypoint wiring
pub mod cli;

// Re-export commonly used types for convenience
pub use types::{CompileRequest, CompileResponse, HealthResponse, PipelineError, Stage};
