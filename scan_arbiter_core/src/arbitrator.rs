use crate::{
    cfg::ArbiterCfg,
    decide::observe,
    event::{ConfirmedScan, DecodeEvent},
    state::{start_session, stop_session, ArbiterState},
};

/// Owns a cfg and the state of one scanning session.
///
/// Convenience for hosts that keep a single session per arbiter; callers that
/// manage many sessions hold `ArbiterState` values directly (see the
/// supervisor crate).
#[derive(Clone, Debug, Default)]
pub struct DetectionArbitrator {
    cfg: ArbiterCfg,
    state: ArbiterState,
}

impl DetectionArbitrator {
    /// Created idle; call `start_session` before feeding decodes.
    pub fn new(cfg: ArbiterCfg) -> Self {
        Self {
            cfg,
            state: ArbiterState::default(),
        }
    }

    pub fn start_session(&mut self) {
        start_session(&mut self.state);
    }

    pub fn stop_session(&mut self) {
        stop_session(&mut self.state);
    }

    pub fn observe(&mut self, event: DecodeEvent) -> Option<ConfirmedScan> {
        observe(event, &self.cfg, &mut self.state)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn cfg(&self) -> &ArbiterCfg {
        &self.cfg
    }

    pub fn state(&self) -> &ArbiterState {
        &self.state
    }
}
