use pretty_assertions::assert_eq;
use scan_arbiter_core::*;

const UPC: &str = "012345678905";

fn started() -> ArbiterState {
    let mut state = ArbiterState::default();
    start_session(&mut state);
    state
}

/// Feed `(code, t)` pairs and return the timestamps of every confirmation.
fn run(cfg: &ArbiterCfg, state: &mut ArbiterState, reads: &[(&str, u64)]) -> Vec<(String, u64)> {
    reads
        .iter()
        .filter_map(|&(code, t)| observe(DecodeEvent::new(code, t), cfg, state))
        .map(|s| (s.code, s.confirmed_at_ms))
        .collect()
}

#[test]
fn third_stable_read_confirms() {
    let cfg = ArbiterCfg::default();
    let mut state = started();

    assert_eq!(observe(DecodeEvent::new(UPC, 0), &cfg, &mut state), None);
    assert_eq!(observe(DecodeEvent::new(UPC, 100), &cfg, &mut state), None);
    assert_eq!(
        observe(DecodeEvent::new(UPC, 200), &cfg, &mut state),
        Some(ConfirmedScan { code: UPC.to_string(), confirmed_at_ms: 200 })
    );
}

#[test]
fn held_label_confirms_once_per_window() {
    let cfg = ArbiterCfg::default();
    let mut state = started();

    let reads: Vec<(&str, u64)> = (0..=50).map(|i| (UPC, i * 100)).collect();
    assert_eq!(reads.len(), 51);

    let hits = run(&cfg, &mut state, &reads);
    assert_eq!(hits, vec![(UPC.to_string(), 200), (UPC.to_string(), 2700)]);
}

#[test]
fn interruption_resets_streak() {
    let cfg = ArbiterCfg::default();
    let mut state = started();

    let hits = run(
        &cfg,
        &mut state,
        &[("A", 0), ("A", 100), ("B", 200), ("A", 300), ("A", 400), ("A", 500)],
    );
    assert_eq!(hits, vec![("A".to_string(), 500)]);
}

#[test]
fn short_runs_never_confirm() {
    let cfg = ArbiterCfg::default();
    let mut state = started();
    assert_eq!(observe(DecodeEvent::new(UPC, 0), &cfg, &mut state), None);

    // Runs of two separated by gaps larger than the window.
    let hits = run(&cfg, &mut state, &[(UPC, 3_000), (UPC, 3_100), (UPC, 6_000), (UPC, 6_100)]);
    assert!(hits.is_empty());
}

#[test]
fn alternating_codes_never_confirm() {
    let cfg = ArbiterCfg::default();
    let mut state = started();

    let reads: Vec<(&str, u64)> = (0..500u64)
        .map(|i| (if i % 2 == 0 { "A" } else { "B" }, i * 100))
        .collect();
    assert!(run(&cfg, &mut state, &reads).is_empty());
}

#[test]
fn different_code_allows_early_reconfirmation() {
    let cfg = ArbiterCfg::default();
    let mut state = started();

    let hits = run(
        &cfg,
        &mut state,
        &[
            ("X", 0), ("X", 100), ("X", 200),
            ("X", 300), ("X", 400), ("X", 500),
            ("Y", 600),
            ("X", 700), ("X", 800), ("X", 900),
        ],
    );
    assert_eq!(hits, vec![("X".to_string(), 200), ("X".to_string(), 900)]);
}

#[test]
fn repeated_code_waits_for_window() {
    let cfg = ArbiterCfg::new(3, 1_000);
    let mut state = started();

    let reads: Vec<(&str, u64)> = (0..=24).map(|i| ("X", i * 100)).collect();
    let hits = run(&cfg, &mut state, &reads);
    assert_eq!(
        hits,
        vec![("X".to_string(), 200), ("X".to_string(), 1_200), ("X".to_string(), 2_200)]
    );
}

#[test]
fn gap_over_window_starts_new_run() {
    let cfg = ArbiterCfg::default();
    let mut state = started();

    let hits = run(
        &cfg,
        &mut state,
        &[("A", 0), ("A", 100), ("A", 2_701), ("A", 2_800), ("A", 2_900)],
    );
    assert_eq!(hits, vec![("A".to_string(), 2_900)]);
}

#[test]
fn gap_equal_to_window_is_continuous() {
    let cfg = ArbiterCfg::default();
    let mut state = started();

    let hits = run(&cfg, &mut state, &[("A", 0), ("A", 2_500), ("A", 5_000)]);
    assert_eq!(hits, vec![("A".to_string(), 5_000)]);
}

#[test]
fn stop_start_requires_fresh_streak() {
    let cfg = ArbiterCfg::default();
    let mut state = started();

    assert!(run(&cfg, &mut state, &[("A", 0), ("A", 100)]).is_empty());
    stop_session(&mut state);
    assert!(state.is_empty());
    assert!(!state.is_active());

    // Stopped sessions drop reads.
    assert_eq!(observe(DecodeEvent::new("A", 150), &cfg, &mut state), None);

    start_session(&mut state);
    assert_eq!(state, ArbiterState::started());
    assert!(run(&cfg, &mut state, &[("A", 200), ("A", 300)]).is_empty());
    assert_eq!(
        run(&cfg, &mut state, &[("A", 400)]),
        vec![("A".to_string(), 400)]
    );
}

#[test]
fn restart_allows_immediate_reconfirmation() {
    let cfg = ArbiterCfg::default();
    let mut state = started();

    assert_eq!(run(&cfg, &mut state, &[("A", 0), ("A", 100), ("A", 200)]).len(), 1);
    start_session(&mut state);
    assert_eq!(run(&cfg, &mut state, &[("A", 300), ("A", 400), ("A", 500)]).len(), 1);
}

#[test]
fn codes_pass_through_unchanged() {
    let cfg = ArbiterCfg::new(1, 2500);
    let mut state = started();

    let scan = observe(DecodeEvent::new("", 0), &cfg, &mut state).unwrap();
    assert_eq!(scan.code, "");
    let scan = observe(DecodeEvent::new(" 0123\n", 10), &cfg, &mut state).unwrap();
    assert_eq!(scan.code, " 0123\n");
}

#[test]
fn arbitrator_wrapper() {
    let mut arb = DetectionArbitrator::new(ArbiterCfg::default());
    assert!(!arb.is_active());
    assert_eq!(arb.observe(DecodeEvent::new(UPC, 0)), None);

    arb.start_session();
    arb.start_session();
    assert!(arb.is_active());
    assert_eq!(arb.observe(DecodeEvent::new(UPC, 0)), None);
    assert_eq!(arb.observe(DecodeEvent::new(UPC, 100)), None);
    assert!(arb.observe(DecodeEvent::new(UPC, 200)).is_some());
    assert_eq!(arb.state().last_confirmed_code.as_deref(), Some(UPC));

    arb.stop_session();
    assert!(arb.state().is_empty());
    assert_eq!(arb.observe(DecodeEvent::new(UPC, 300)), None);
}

#[test]
fn sessions_are_independent() {
    let cfg = ArbiterCfg::default();
    let mut a = started();
    let mut b = started();

    assert_eq!(run(&cfg, &mut a, &[("A", 0), ("A", 100)]).len(), 0);
    assert_eq!(run(&cfg, &mut b, &[("B", 0), ("B", 100), ("B", 200)]).len(), 1);
    assert_eq!(run(&cfg, &mut a, &[("A", 200)]), vec![("A".to_string(), 200)]);
}
