/// One successful per-frame decode reported by the scanning engine.
///
/// `timestamp_ms` is on whatever monotonic clock the engine uses; only
/// differences between timestamps matter.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecodeEvent {
    pub code: String,
    pub timestamp_ms: u64,
}

impl DecodeEvent {
    pub fn new(code: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            code: code.into(),
            timestamp_ms,
        }
    }
}

/// A code the caller should act on exactly once (i.e. hand to product lookup).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConfirmedScan {
    pub code: String,
    pub confirmed_at_ms: u64,
}
