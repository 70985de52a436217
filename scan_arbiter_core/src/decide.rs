//scan_arbiter_core/decide.rs

use crate::{cfg::ArbiterCfg, event::ConfirmedScan, event::DecodeEvent, state::ArbiterState};

/// Feed one decode into the arbiter; returns a scan when the read is confirmed.
///
/// Total over its input: empty or odd-looking codes are treated like any other
/// value. Runs in constant time apart from the code comparison, so it is safe
/// to call from the engine's per-frame callback.
///
/// Policy:
/// - a different code, or a gap above `reset_window_ms` since the previous
///   read, starts a new candidate with a streak of 1; otherwise the streak grows
/// - a streak of `confirmation_threshold` confirms the candidate
/// - a code already confirmed is not confirmed again until `reset_window_ms`
///   has passed since that confirmation, unless another code came in between
/// - confirming clears the streak, so a held code must build a new one
pub fn observe(event: DecodeEvent, cfg: &ArbiterCfg, state: &mut ArbiterState) -> Option<ConfirmedScan> {
    if !state.active {
        return None;
    }

    let DecodeEvent { code, timestamp_ms: now } = event;
    let threshold = cfg.confirmation_threshold.max(1);

    let same_code = state.candidate_code.as_deref() == Some(code.as_str());
    let gap_exceeded = state
        .last_scan_at
        .is_some_and(|prev| now.saturating_sub(prev) > cfg.reset_window_ms);

    if !same_code || gap_exceeded {
        // A different code interrupts the confirmed one.
        if state.last_confirmed_code.as_deref() != Some(code.as_str()) {
            state.last_confirmed_code = None;
            state.last_confirmed_at = None;
        }
        state.candidate_code = Some(code);
        state.candidate_streak = 1;
    } else {
        // Saturate instead of counting every frame a label is held.
        state.candidate_streak = state.candidate_streak.saturating_add(1).min(threshold);
    }
    state.last_scan_at = Some(now);

    if state.candidate_streak < threshold {
        return None;
    }

    let Some(candidate) = state.candidate_code.as_deref() else {
        return None;
    };
    if held_since_confirmation(candidate, now, cfg, state) {
        return None;
    }
    let code = candidate.to_owned();

    state.last_confirmed_code = Some(code.clone());
    state.last_confirmed_at = Some(now);
    state.candidate_streak = 0;

    Some(ConfirmedScan {
        code,
        confirmed_at_ms: now,
    })
}

#[inline]
fn held_since_confirmation(code: &str, now: u64, cfg: &ArbiterCfg, state: &ArbiterState) -> bool {
    state.last_confirmed_code.as_deref() == Some(code)
        && state
            .last_confirmed_at
            .is_some_and(|at| now.saturating_sub(at) < cfg.reset_window_ms)
}
