/// Per-session arbitration state. Owned by the caller and passed into
/// [`crate::observe`]; nothing in this crate keeps global state.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArbiterState {
    /// Set by `start_session`, cleared by `stop_session`.
    pub active: bool,
    pub candidate_code: Option<String>,
    pub candidate_streak: u32,
    pub last_scan_at: Option<u64>,
    pub last_confirmed_code: Option<String>,
    pub last_confirmed_at: Option<u64>,
}

impl ArbiterState {
    /// Fresh state for a session that is already running.
    pub fn started() -> Self {
        Self {
            active: true,
            ..Self::default()
        }
    }

    /// Drop every tracked read and confirmation. Leaves `active` alone.
    #[inline]
    pub fn reset(&mut self) {
        self.candidate_code = None;
        self.candidate_streak = 0;
        self.last_scan_at = None;
        self.last_confirmed_code = None;
        self.last_confirmed_at = None;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True when nothing has been observed since the last reset.
    pub fn is_empty(&self) -> bool {
        self.candidate_code.is_none()
            && self.candidate_streak == 0
            && self.last_scan_at.is_none()
            && self.last_confirmed_code.is_none()
            && self.last_confirmed_at.is_none()
    }
}

/// Reset `state` and mark the session running. Idempotent.
pub fn start_session(state: &mut ArbiterState) {
    state.reset();
    state.active = true;
}

/// Reset `state`; `observe` emits nothing until the next `start_session`.
pub fn stop_session(state: &mut ArbiterState) {
    state.reset();
    state.active = false;
}
