//! Binary snapshot format for `SupervisorSnapshot`.
//!
//! Little-endian throughout:
//! ```text
//! [u32 magic = "SCN1"][u32 version = 1][u32 count]
//! repeated count times:
//!   [str session_id][u8 active][opt-str candidate_code][u32 candidate_streak]
//!   [opt-u64 last_scan_at][opt-str last_confirmed_code][opt-u64 last_confirmed_at]
//! str     = [u32 len][utf-8 bytes]
//! opt-T   = [u8 0] | [u8 1][T]
//! ```

use scan_arbiter_core::ArbiterState;
use scan_arbiter_supervisor::SupervisorSnapshot;
use thiserror::Error;

pub const SNAP_MAGIC: u32 = 0x314E_4353; // "SCN1" little-endian
pub const SNAP_VERSION: u32 = 1;

/// Minimum valid length: magic + version + count.
pub const SNAP_HEADER_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("snapshot truncated at byte {0}")]
    Truncated(usize),
    #[error("bad snapshot magic {0:#010x}")]
    BadMagic(u32),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid utf-8 in snapshot string")]
    InvalidUtf8,
    #[error("invalid presence flag {0}")]
    BadFlag(u8),
}

impl WireError {
    /// Stable return code for the C ABI.
    pub fn rc(&self) -> i32 {
        match self {
            WireError::Truncated(_) => -2,
            WireError::InvalidUtf8 => -5,
            WireError::BadFlag(_) => -6,
            WireError::BadMagic(_) => -8,
            WireError::UnsupportedVersion(_) => -9,
        }
    }
}

pub fn encode_snapshot(snap: &SupervisorSnapshot) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    buf.extend_from_slice(&SNAP_MAGIC.to_le_bytes());
    buf.extend_from_slice(&SNAP_VERSION.to_le_bytes());
    buf.extend_from_slice(&(snap.states.len() as u32).to_le_bytes());

    for (id, st) in &snap.states {
        put_str(&mut buf, id);
        buf.push(st.active as u8);
        put_opt_str(&mut buf, st.candidate_code.as_deref());
        buf.extend_from_slice(&st.candidate_streak.to_le_bytes());
        put_opt_u64(&mut buf, st.last_scan_at);
        put_opt_str(&mut buf, st.last_confirmed_code.as_deref());
        put_opt_u64(&mut buf, st.last_confirmed_at);
    }
    buf
}

pub fn decode_snapshot(data: &[u8]) -> Result<SupervisorSnapshot, WireError> {
    let mut r = Reader { data, pos: 0 };

    let magic = r.u32()?;
    if magic != SNAP_MAGIC {
        return Err(WireError::BadMagic(magic));
    }
    let ver = r.u32()?;
    if ver != SNAP_VERSION {
        return Err(WireError::UnsupportedVersion(ver));
    }

    let count = r.u32()? as usize;
    // Each entry takes at least 15 bytes; don't trust `count` for the allocation.
    let mut states = Vec::with_capacity(count.min(data.len() / 15));
    for _ in 0..count {
        let id = r.string()?;
        let st = ArbiterState {
            active: r.flag()?,
            candidate_code: r.opt(Reader::string)?,
            candidate_streak: r.u32()?,
            last_scan_at: r.opt(Reader::u64)?,
            last_confirmed_code: r.opt(Reader::string)?,
            last_confirmed_at: r.opt(Reader::u64)?,
        };
        states.push((id, st));
    }

    Ok(SupervisorSnapshot { states })
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn put_opt_str(buf: &mut Vec<u8>, s: Option<&str>) {
    match s {
        Some(s) => {
            buf.push(1);
            put_str(buf, s);
        }
        None => buf.push(0),
    }
}

fn put_opt_u64(buf: &mut Vec<u8>, v: Option<u64>) {
    match v {
        Some(v) => {
            buf.push(1);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        None => buf.push(0),
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len());
        let Some(end) = end else {
            return Err(WireError::Truncated(self.pos));
        };
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let pos = self.pos;
        self.take(N)?.try_into().map_err(|_| WireError::Truncated(pos))
    }

    fn u32(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, WireError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn flag(&mut self) -> Result<bool, WireError> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::BadFlag(other)),
        }
    }

    fn string(&mut self) -> Result<String, WireError> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| WireError::InvalidUtf8)
    }

    fn opt<T>(&mut self, read: fn(&mut Self) -> Result<T, WireError>) -> Result<Option<T>, WireError> {
        if self.flag()? {
            read(self).map(Some)
        } else {
            Ok(None)
        }
    }
}
