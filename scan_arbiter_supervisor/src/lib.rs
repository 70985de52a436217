//! scan_arbiter_supervisor
//!
//! Outside-world facing orchestration layer for `scan_arbiter_core`.
//!
//! Responsibilities:
//! - own per-session `ArbiterState`
//! - shard state by `session_id` (deterministic)
//! - convert raw engine reads into `DecodeEvent`s via adapters
//! - invoke the core `observe` decision
//!
//! Non-goals:
//! - no IO
//! - no async
//! - no policy logic (lives in core)

pub mod adapter;
pub mod supervisor;

pub use adapter::{
    FrameRead,
    DecodeEventBuilder,
    BasicDecodeBuilder,
    build_decode_batch,
};

pub use supervisor::{
    ScanSupervisor,
    ScanAction,
    SupervisorSnapshot,
    RestoreStats,
};
