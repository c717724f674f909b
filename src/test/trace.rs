use super::internal_sim;
use crate::backend::TrialIndex;
use crate::trace::TraceEventKind;

#[test]
fn trace_records_retroactive_promotion() {
    let mut sim = internal_sim(1);
    assert!(sim.trace().is_none());
    sim.enable_trace();

    sim.run_trial(TrialIndex(0), 0.25).expect("admit");
    sim.run_trial(TrialIndex(1), 0.5).expect("admit");
    sim.update();
    sim.update();

    let trace = sim.take_trace().expect("trace enabled");
    let kinds: Vec<_> = trace.for_trial(TrialIndex(1)).map(|e| (e.t, e.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (
                0.0,
                TraceEventKind::Queued {
                    sim_runtime: 0.5,
                    queue_len: 1
                }
            ),
            (
                1.0,
                TraceEventKind::Promoted {
                    start: 0.25,
                    waited: Some(0.25)
                }
            ),
            (
                1.0,
                TraceEventKind::Completed {
                    start: 0.25,
                    deadline: 0.75
                }
            ),
        ]
    );
    assert!(sim.trace().is_none());
}

#[test]
fn trace_serializes_with_flattened_kind() {
    let mut sim = internal_sim(1);
    sim.enable_trace();
    sim.run_trial(TrialIndex(3), 1.0).expect("admit");

    let raw = sim.trace().expect("trace enabled").to_json().expect("serialize");
    let v: serde_json::Value = serde_json::from_str(&raw).expect("parse trace");
    let arr = v.as_array().expect("trace is a JSON array");
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0].get("kind").and_then(|k| k.as_str()), Some("started"));
    assert_eq!(arr[0].get("trial_index").and_then(|k| k.as_u64()), Some(3));
}

#[test]
fn reset_keeps_recorded_trace() {
    let mut sim = internal_sim(1);
    sim.enable_trace();
    sim.run_trial(TrialIndex(0), 1.0).expect("admit");
    sim.reset();
    assert_eq!(sim.trace().map(|t| t.events.len()), Some(1));
}
