//! Replays pointer streams written as JSON, the shape hosts serialize them in.

use framebind_gesture_core::{GestureConfig, GesturePhase, PanRecognizer, PinchRecognizer, PointerEvent};

fn stream(json: &str) -> Vec<PointerEvent> {
    serde_json::from_str(json).expect("valid pointer stream")
}

#[test]
fn pan_stream_round() {
    let events = stream(
        r#"[
        {"action":"down","pointer_id":3,"pointers":[{"id":3,"x":100,"y":100}],"time_ms":1000},
        {"action":"move","pointer_id":3,"pointers":[{"id":3,"x":130,"y":115}],"time_ms":1016},
        {"action":"up","pointer_id":3,"pointers":[{"id":3,"x":130,"y":115}],"time_ms":1032}
    ]"#,
    );
    let mut pan = PanRecognizer::new(&GestureConfig::default());
    let phases: Vec<_> = events.iter().filter_map(|e| pan.on_pointer(e)).collect();
    assert_eq!(phases.len(), 3);
    assert!(matches!(phases[0], GesturePhase::Began(_)));
    assert_eq!(phases[1].data().dx, 30.0);
    assert_eq!(phases[1].data().dy, 15.0);
    assert!(matches!(phases[2], GesturePhase::Ended(u) if u.dx == 30.0 && u.velocity_x > 0.0));
}

#[test]
fn pinch_stream_ends_on_final_up() {
    let events = stream(
        r#"[
        {"action":"down","pointer_id":0,"pointers":[{"id":0,"x":0,"y":0}],"time_ms":0},
        {"action":"pointer_down","pointer_id":1,"pointers":[{"id":0,"x":0,"y":0},{"id":1,"x":100,"y":0}],"time_ms":5},
        {"action":"move","pointer_id":1,"pointers":[{"id":0,"x":0,"y":0},{"id":1,"x":0,"y":50}],"time_ms":21},
        {"action":"up","pointer_id":0,"pointers":[{"id":0,"x":0,"y":0}],"time_ms":40}
    ]"#,
    );
    let mut pinch = PinchRecognizer::new();
    let phases: Vec<_> = events.iter().filter_map(|e| pinch.on_pointer(e)).collect();
    assert_eq!(phases.len(), 3);
    match phases[2] {
        GesturePhase::Ended(u) => assert!((u.scale - 0.5).abs() < 1e-12),
        other => panic!("expected Ended, got {other:?}"),
    }
}
