#![allow(clippy::missing_safety_doc)]

use std::ptr;

use scan_arbiter_core::{ArbiterCfg, DecodeEvent};
use scan_arbiter_supervisor::ScanSupervisor;
use tracing::warn;

pub mod wire;

/// FFI ABI version for scan_arbiter_ffi.
///
/// Bump this when any `#[repr(C)]` struct layout or exported function signature changes.
pub const SCAN_ARBITER_FFI_VERSION: u32 = 1;

/// Return codes shared by the session and observe calls.
pub const SCAN_RC_OK: i32 = 0;
pub const SCAN_RC_CONFIRMED: i32 = 1;
pub const SCAN_RC_NULL: i32 = -1;
pub const SCAN_RC_BAD_UTF8: i32 = -5;

#[no_mangle]
pub extern "C" fn scan_arbiter_ffi_version() -> u32 {
    SCAN_ARBITER_FFI_VERSION
}

/// Opaque handle exposed over FFI.
#[repr(C)]
pub struct ScanArbiterSupervisor {
    inner: ScanSupervisor,
}

/// FFI string view (UTF-8 bytes).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ScanStr {
    pub ptr: *const u8,
    pub len: usize,
}

impl ScanStr {
    fn as_str(&self) -> Option<&str> {
        if self.ptr.is_null() {
            return None;
        }
        let bytes = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        std::str::from_utf8(bytes).ok()
    }
}

/// Owned byte buffer (snapshots, confirmed codes).
#[repr(C)]
pub struct ScanBytes {
    pub ptr: *mut u8,
    pub len: usize,
}

impl ScanBytes {
    fn empty() -> Self {
        ScanBytes { ptr: ptr::null_mut(), len: 0 }
    }

    fn from_vec(v: Vec<u8>) -> Self {
        let mut boxed = v.into_boxed_slice();
        let ptr = boxed.as_mut_ptr();
        let len = boxed.len();
        std::mem::forget(boxed);
        ScanBytes { ptr, len }
    }

    unsafe fn free(self) {
        if !self.ptr.is_null() {
            let slice_ptr = ptr::slice_from_raw_parts_mut(self.ptr, self.len);
            drop(Box::from_raw(slice_ptr));
        }
    }
}

/// Confirmed scan handed to the caller.
/// `code` is owned; release it with `scan_arbiter_scan_free`.
#[repr(C)]
pub struct ScanConfirmed {
    pub code: ScanBytes,
    pub confirmed_at_ms: u64,
}

/// Restore result statistics (FFI-safe).
#[repr(C)]
pub struct ScanRestoreStats {
    pub applied: u32,
    pub overwritten: u32,
    pub rc: i32,
}

/// Arbiter cfg for FFI.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ScanCfg {
    pub confirmation_threshold: u32,
    pub reset_window_ms: u64,
}

#[no_mangle]
pub extern "C" fn scan_arbiter_cfg_default() -> ScanCfg {
    let d = ArbiterCfg::default();
    ScanCfg {
        confirmation_threshold: d.confirmation_threshold,
        reset_window_ms: d.reset_window_ms,
    }
}

fn cfg_from_ffi(c: ScanCfg) -> ArbiterCfg {
    let cfg = ArbiterCfg::new(c.confirmation_threshold, c.reset_window_ms);
    if let Err(e) = cfg.validate() {
        warn!(error = %e, "invalid cfg over ffi, using defaults");
        return ArbiterCfg::default();
    }
    cfg
}

/// Create a new supervisor handle.
///
/// Notes:
/// - `shards` controls internal state sharding (session_id -> shard).
/// - This library does not spawn threads. Concurrent calls on one handle serialize
///   per-shard via internal mutexes.
/// - An invalid cfg (threshold 0) falls back to the defaults.
#[no_mangle]
pub extern "C" fn scan_arbiter_supervisor_new(shards: usize, cfg: ScanCfg) -> *mut ScanArbiterSupervisor {
    let handle = ScanArbiterSupervisor {
        inner: ScanSupervisor::new(shards.max(1), cfg_from_ffi(cfg)),
    };
    Box::into_raw(Box::new(handle))
}

#[no_mangle]
pub unsafe extern "C" fn scan_arbiter_supervisor_free(h: *mut ScanArbiterSupervisor) {
    if !h.is_null() {
        drop(Box::from_raw(h));
    }
}

unsafe fn with_session<F>(h: *const ScanArbiterSupervisor, session_id: ScanStr, f: F) -> i32
where
    F: FnOnce(&ScanSupervisor, &str) -> i32,
{
    if h.is_null() || session_id.ptr.is_null() {
        return SCAN_RC_NULL;
    }
    let handle = &*h;
    match session_id.as_str() {
        Some(id) => f(&handle.inner, id),
        None => SCAN_RC_BAD_UTF8,
    }
}

#[no_mangle]
pub unsafe extern "C" fn scan_arbiter_session_start(h: *const ScanArbiterSupervisor, session_id: ScanStr) -> i32 {
    with_session(h, session_id, |sup, id| {
        sup.start_session(id);
        SCAN_RC_OK
    })
}

#[no_mangle]
pub unsafe extern "C" fn scan_arbiter_session_stop(h: *const ScanArbiterSupervisor, session_id: ScanStr) -> i32 {
    with_session(h, session_id, |sup, id| {
        sup.stop_session(id);
        SCAN_RC_OK
    })
}

/// Returns 1 if the session existed, 0 otherwise.
#[no_mangle]
pub unsafe extern "C" fn scan_arbiter_session_end(h: *const ScanArbiterSupervisor, session_id: ScanStr) -> i32 {
    with_session(h, session_id, |sup, id| sup.end_session(id) as i32)
}

/// Observe one decoded frame.
///
/// Returns `SCAN_RC_CONFIRMED` and fills `out` when the read is confirmed,
/// `SCAN_RC_OK` when there is nothing to do, negative on bad arguments.
/// `code` must be UTF-8; a null pointer with zero length is the empty code.
#[no_mangle]
pub unsafe extern "C" fn scan_arbiter_observe(
    h: *const ScanArbiterSupervisor,
    session_id: ScanStr,
    code: ScanStr,
    timestamp_ms: u64,
    out: *mut ScanConfirmed,
) -> i32 {
    if out.is_null() {
        return SCAN_RC_NULL;
    }
    with_session(h, session_id, |sup, id| {
        let code = if code.ptr.is_null() && code.len == 0 {
            ""
        } else {
            match code.as_str() {
                Some(c) => c,
                None => return SCAN_RC_BAD_UTF8,
            }
        };

        match sup.observe(id, DecodeEvent::new(code, timestamp_ms)) {
            Some(scan) => {
                out.write(ScanConfirmed {
                    code: ScanBytes::from_vec(scan.code.into_bytes()),
                    confirmed_at_ms: scan.confirmed_at_ms,
                });
                SCAN_RC_CONFIRMED
            }
            None => SCAN_RC_OK,
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn scan_arbiter_scan_free(scan: ScanConfirmed) {
    scan.code.free();
}

/// Snapshot all sessions (format in `wire`). Free with `scan_arbiter_bytes_free`.
#[no_mangle]
pub unsafe extern "C" fn scan_arbiter_snapshot(h: *const ScanArbiterSupervisor) -> ScanBytes {
    if h.is_null() {
        return ScanBytes::empty();
    }
    let handle = &*h;
    ScanBytes::from_vec(wire::encode_snapshot(&handle.inner.snapshot()))
}

#[no_mangle]
pub unsafe extern "C" fn scan_arbiter_bytes_free(b: ScanBytes) {
    b.free();
}

/// Restore sessions from a snapshot. `merge != 0` keeps sessions absent from the snapshot.
#[no_mangle]
pub unsafe extern "C" fn scan_arbiter_restore(
    h: *const ScanArbiterSupervisor,
    bytes: *const u8,
    len: usize,
    merge: u8,
) -> ScanRestoreStats {
    if h.is_null() || bytes.is_null() || len < wire::SNAP_HEADER_LEN {
        return ScanRestoreStats { applied: 0, overwritten: 0, rc: SCAN_RC_NULL };
    }
    let handle = &*h;
    let data = std::slice::from_raw_parts(bytes, len);

    let snap = match wire::decode_snapshot(data) {
        Ok(snap) => snap,
        Err(e) => {
            warn!(error = %e, "rejected scan arbiter snapshot");
            return ScanRestoreStats { applied: 0, overwritten: 0, rc: e.rc() };
        }
    };

    let stats = if merge != 0 {
        handle.inner.restore_merge(snap)
    } else {
        handle.inner.restore(snap)
    };

    ScanRestoreStats {
        applied: stats.applied as u32,
        overwritten: stats.overwritten as u32,
        rc: SCAN_RC_OK,
    }
}
