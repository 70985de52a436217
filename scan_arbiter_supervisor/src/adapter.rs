//! Domain adapter layer: convert raw scanning-engine reads into `scan_arbiter_core::DecodeEvent`.
//!
//! This module is intentionally small and policy-light:
//! - No IO
//! - No async
//! - No validation of the decoded text (that belongs to the lookup stage)
//!
//! Hosts provide a `DecodeEventBuilder` (or use the provided `BasicDecodeBuilder`) to
//! decide which raw reads reach the arbiter.

use std::borrow::Cow;

use scan_arbiter_core::{DecodeEvent, Symbology};

/// A raw per-frame read from the scanning engine (html5-qrcode, Quagga, a native decoder...).
#[derive(Clone, Debug)]
pub struct FrameRead<'a> {
    /// The scanning session (browser tab, camera) the frame belongs to.
    pub session_id: Cow<'a, str>,
    /// Decoded text exactly as the engine reported it.
    pub text: Cow<'a, str>,
    /// Format reported by the engine, when it reports one.
    pub format: Option<Symbology>,
    pub timestamp_ms: u64,
}

impl<'a> FrameRead<'a> {
    /// Convenience constructor.
    pub fn new(session_id: impl Into<Cow<'a, str>>, text: impl Into<Cow<'a, str>>, timestamp_ms: u64) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
            format: None,
            timestamp_ms,
        }
    }

    /// Attach the reported format.
    pub fn with_format(mut self, format: Symbology) -> Self {
        self.format = Some(format);
        self
    }
}

/// Trait: map a `FrameRead` into at most one `DecodeEvent`.
pub trait DecodeEventBuilder {
    /// `None` drops the read before it reaches the arbiter.
    fn build(&self, read: &FrameRead<'_>) -> Option<DecodeEvent>;
}

/// Basic builder that only filters by format.
///
/// Reads without a reported format always pass. Text is never altered.
#[derive(Clone, Debug)]
pub struct BasicDecodeBuilder {
    pub formats: Vec<Symbology>,
}

impl BasicDecodeBuilder {
    pub fn new(formats: impl IntoIterator<Item = Symbology>) -> Self {
        Self {
            formats: formats.into_iter().collect(),
        }
    }

    #[inline]
    pub fn accepts(&self, format: Option<Symbology>) -> bool {
        format.map_or(true, |f| self.formats.contains(&f))
    }
}

impl Default for BasicDecodeBuilder {
    fn default() -> Self {
        Self::new(Symbology::RETAIL)
    }
}

impl DecodeEventBuilder for BasicDecodeBuilder {
    fn build(&self, read: &FrameRead<'_>) -> Option<DecodeEvent> {
        if !self.accepts(read.format) {
            return None;
        }
        Some(DecodeEvent::new(read.text.to_string(), read.timestamp_ms))
    }
}

/// Helper: build `(session_id, event)` pairs for a batch of reads, keeping input order.
pub fn build_decode_batch<B: DecodeEventBuilder>(builder: &B, reads: &[FrameRead<'_>]) -> Vec<(String, DecodeEvent)> {
    reads
        .iter()
        .filter_map(|r| builder.build(r).map(|ev| (r.session_id.to_string(), ev)))
        .collect()
}
