//! Sharded scan session supervisor.
//!
//! This crate is the outside-world facing orchestration layer around `scan_arbiter_core`:
//! - owns per-session `ArbiterState`
//! - applies optional per-session cfg overrides
//! - runs the core `observe` decision under the owning shard's lock
//!
//! No IO. No async. Concurrency is achieved by sharding state by `session_id`.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use scan_arbiter_core::{observe, start_session, stop_session, ArbiterCfg, ArbiterState, ConfirmedScan, DecodeEvent};
use tracing::{debug, info, trace};

use crate::adapter::{build_decode_batch, DecodeEventBuilder, FrameRead};

/// Output action from the supervisor: one confirmed scan for one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanAction {
    pub session_id: String,
    pub scan: ConfirmedScan,
}

/// Snapshot of supervisor state for storage-agnostic persistence.
///
/// Pure data: callers decide how/where to store it.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SupervisorSnapshot {
    /// Per-session arbiter state.
    pub states: Vec<(String, ArbiterState)>,
}

impl SupervisorSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

/// Simple observability counters returned by restore/import operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RestoreStats {
    /// Number of session states applied from the snapshot/iterator.
    pub applied: usize,
    /// Number of existing session states that were overwritten.
    pub overwritten: usize,
}

#[derive(Default, Debug)]
struct Shard {
    states: HashMap<String, ArbiterState>,
}

/// Deterministic FNV-1a hash (stable across runs).
fn fnv1a_u64(s: &str) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

fn shard_index(session_id: &str, shard_count: usize) -> usize {
    if shard_count <= 1 {
        return 0;
    }
    (fnv1a_u64(session_id) as usize) % shard_count
}

/// A sharded supervisor. One scanning session is one `(session_id -> ArbiterState)` entry.
///
/// Every operation on a session runs under its shard's mutex, so `stop_session`
/// from a UI thread never interleaves with an in-flight `observe` from the
/// decode callback.
#[derive(Debug)]
pub struct ScanSupervisor {
    cfg: ArbiterCfg,
    /// Optional per-session cfg overrides.
    cfg_overrides: HashMap<String, ArbiterCfg>,
    shards: usize,
    state_shards: Vec<Mutex<Shard>>,
}

impl ScanSupervisor {
    /// Create a supervisor with `shards` (concurrency count). `shards=1` is the default.
    pub fn new(shards: usize, cfg: ArbiterCfg) -> Self {
        let shards = shards.max(1);
        let state_shards = (0..shards).map(|_| Mutex::new(Shard::default())).collect();

        Self {
            cfg,
            cfg_overrides: HashMap::new(),
            shards,
            state_shards,
        }
    }

    pub fn cfg(&self) -> &ArbiterCfg {
        &self.cfg
    }

    /// Override cfg for a specific `session_id`.
    pub fn set_cfg_override(&mut self, session_id: impl Into<String>, cfg: ArbiterCfg) {
        self.cfg_overrides.insert(session_id.into(), cfg);
    }

    /// Remove cfg override for a specific `session_id`.
    pub fn clear_cfg_override(&mut self, session_id: &str) {
        self.cfg_overrides.remove(session_id);
    }

    fn cfg_for(&self, session_id: &str) -> &ArbiterCfg {
        self.cfg_overrides.get(session_id).unwrap_or(&self.cfg)
    }

    // Session state is plain data, so a panic while holding the lock leaves
    // nothing half-written worth refusing.
    fn lock_shard(&self, idx: usize) -> MutexGuard<'_, Shard> {
        self.state_shards[idx]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn shard_for(&self, session_id: &str) -> MutexGuard<'_, Shard> {
        self.lock_shard(shard_index(session_id, self.shards))
    }

    /// Start (or restart) a session. Idempotent; any previous state is cleared.
    pub fn start_session(&self, session_id: &str) {
        let mut guard = self.shard_for(session_id);
        let state = guard.states.entry(session_id.to_string()).or_default();
        start_session(state);
        debug!(session_id, "scan session started");
    }

    /// Stop a session. Its reads are ignored until it is started again.
    /// Unknown sessions are left alone.
    pub fn stop_session(&self, session_id: &str) {
        let mut guard = self.shard_for(session_id);
        if let Some(state) = guard.states.get_mut(session_id) {
            stop_session(state);
            debug!(session_id, "scan session stopped");
        }
    }

    /// Destroy a session's state. Returns whether it existed.
    pub fn end_session(&self, session_id: &str) -> bool {
        let removed = self.shard_for(session_id).states.remove(session_id).is_some();
        if removed {
            debug!(session_id, "scan session ended");
        }
        removed
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.shard_for(session_id)
            .states
            .get(session_id)
            .is_some_and(ArbiterState::is_active)
    }

    /// Number of known sessions, started or stopped.
    pub fn session_count(&self) -> usize {
        (0..self.shards).map(|i| self.lock_shard(i).states.len()).sum()
    }

    /// Observe one decode for `session_id`. Unknown sessions yield `None`.
    pub fn observe(&self, session_id: &str, event: DecodeEvent) -> Option<ConfirmedScan> {
        let cfg = self.cfg_for(session_id);
        let mut guard = self.shard_for(session_id);
        let Some(state) = guard.states.get_mut(session_id) else {
            trace!(session_id, code = %event.code, "read for unknown session dropped");
            return None;
        };
        let scan = observe(event, cfg, state);
        if let Some(scan) = &scan {
            info!(session_id, code = %scan.code, at_ms = scan.confirmed_at_ms, "scan confirmed");
        }
        scan
    }

    /// Ingest a batch of raw engine reads and return one action per confirmation.
    ///
    /// Reads are observed strictly in input order (streaks depend on it) and
    /// actions come back in that same order.
    pub fn ingest<B: DecodeEventBuilder>(&self, builder: &B, reads: &[FrameRead<'_>]) -> Vec<ScanAction> {
        let events = build_decode_batch(builder, reads);
        if events.len() < reads.len() {
            trace!(dropped = reads.len() - events.len(), "reads filtered by builder");
        }

        let mut out = Vec::new();
        for (session_id, event) in events {
            if let Some(scan) = self.observe(&session_id, event) {
                out.push(ScanAction { session_id, scan });
            }
        }
        out
    }

    /// Export all `(session_id, ArbiterState)` pairs as a plain snapshot.
    ///
    /// Deterministic ordering: states are returned sorted by `session_id`.
    pub fn snapshot(&self) -> SupervisorSnapshot {
        self.snapshot_filtered(|_, _| true)
    }

    /// Export a snapshot filtered by a caller-provided predicate.
    pub fn snapshot_filtered<F>(&self, mut predicate: F) -> SupervisorSnapshot
    where
        F: FnMut(&str, &ArbiterState) -> bool,
    {
        let mut out: Vec<(String, ArbiterState)> = Vec::new();

        // Lock shards in a stable order.
        for idx in 0..self.shards {
            let guard = self.lock_shard(idx);
            for (k, v) in guard.states.iter() {
                if predicate(k.as_str(), v) {
                    out.push((k.clone(), v.clone()));
                }
            }
        }

        out.sort_by(|a, b| a.0.cmp(&b.0));
        SupervisorSnapshot { states: out }
    }

    /// Export a snapshot containing only the provided `session_id`s.
    pub fn snapshot_sessions(&self, session_ids: &[&str]) -> SupervisorSnapshot {
        let want: HashSet<&str> = session_ids.iter().copied().collect();
        self.snapshot_filtered(|id, _state| want.contains(id))
    }

    /// Restore supervisor state from a previously exported snapshot.
    ///
    /// This overwrites any existing per-session state currently held by the supervisor.
    pub fn restore(&self, snap: SupervisorSnapshot) -> RestoreStats {
        for idx in 0..self.shards {
            self.lock_shard(idx).states.clear();
        }
        self.import_state(snap.states)
    }

    /// Restore by merging a snapshot into the current state.
    ///
    /// Unlike `restore()`, this does **not** clear existing state first.
    /// Snapshot entries overwrite existing entries with the same `session_id`.
    pub fn restore_merge(&self, snap: SupervisorSnapshot) -> RestoreStats {
        self.import_state(snap.states)
    }

    fn import_state<I>(&self, iter: I) -> RestoreStats
    where
        I: IntoIterator<Item = (String, ArbiterState)>,
    {
        let mut stats = RestoreStats::default();
        for (session_id, state) in iter {
            let mut guard = self.shard_for(&session_id);
            if guard.states.insert(session_id, state).is_some() {
                stats.overwritten += 1;
            }
            stats.applied += 1;
        }
        debug!(applied = stats.applied, overwritten = stats.overwritten, "scan sessions restored");
        stats
    }
}

impl Default for ScanSupervisor {
    fn default() -> Self {
        Self::new(1, ArbiterCfg::default())
    }
}
