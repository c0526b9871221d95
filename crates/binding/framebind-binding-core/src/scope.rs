//! Kind-specific scope keys.
//!
//! Each binding kind owns a fixed set of keys. The writers below are the only
//! place those keys are set, and `payload_fields` is the only place they are read
//! back into upstream event payloads.

use framebind_api_core::{EventKind, EventPayload, ResolutionTranslator, Scope};
use framebind_gesture_core::{PanUpdate, ScrollUpdate};

/// Pan: `x`/`y` and `dx`/`dy` are logical, `internal_*` stay in device units.
pub fn write_pan(scope: &mut Scope, translator: &dyn ResolutionTranslator, update: &PanUpdate) {
    scope.set_f64("x", translator.native_to_web(update.dx));
    scope.set_f64("y", translator.native_to_web(update.dy));
    scope.set_f64("internal_x", update.dx);
    scope.set_f64("internal_y", update.dy);
    scope.set_f64("dx", translator.native_to_web(update.step_x));
    scope.set_f64("dy", translator.native_to_web(update.step_y));
}

pub fn write_scroll(
    scope: &mut Scope,
    translator: &dyn ResolutionTranslator,
    update: &ScrollUpdate,
) {
    scope.set_f64("x", translator.native_to_web(update.x));
    scope.set_f64("y", translator.native_to_web(update.y));
    scope.set_f64("dx", translator.native_to_web(update.dx));
    scope.set_f64("dy", translator.native_to_web(update.dy));
    scope.set_f64("tdx", translator.native_to_web(update.tdx));
    scope.set_f64("tdy", translator.native_to_web(update.tdy));
    scope.set_f64("internal_x", update.x);
    scope.set_f64("internal_y", update.y);
}

pub fn write_rotation(scope: &mut Scope, degrees: f64) {
    scope.set_f64("r", degrees);
}

pub fn write_pinch(scope: &mut Scope, scale: f64) {
    scope.set_f64("s", scale);
}

pub fn write_spring(scope: &mut Scope, position: f64, velocity: f64) {
    scope.set_f64("p", position);
    scope.set_f64("v", velocity);
}

pub fn write_timing(scope: &mut Scope, elapsed_ms: f64) {
    scope.set_f64("t", elapsed_ms);
}

/// Append the kind's payload fields, read from the current scope.
///
/// Missing keys (nothing measured yet) are reported as `0`.
pub fn payload_fields(
    kind: EventKind,
    scope: &Scope,
    translator: &dyn ResolutionTranslator,
    payload: EventPayload,
) -> EventPayload {
    let read = |key: &str| scope.get_f64(key).unwrap_or(0.0);
    match kind {
        EventKind::Pan => payload
            .with_f64("deltaX", translator.native_to_web(read("internal_x")))
            .with_f64("deltaY", translator.native_to_web(read("internal_y"))),
        EventKind::Scroll => payload
            .with_f64("x", translator.native_to_web(read("internal_x")))
            .with_f64("y", translator.native_to_web(read("internal_y")))
            .with_f64("dx", read("dx"))
            .with_f64("dy", read("dy"))
            .with_f64("tdx", read("tdx"))
            .with_f64("tdy", read("tdy")),
        EventKind::Rotation => payload.with_f64("rotation", read("r")),
        EventKind::Pinch => payload.with_f64("scale", read("s")),
        EventKind::Timing => payload.with_f64("t", read("t")),
        EventKind::Spring => payload
            .with_f64("position", read("p"))
            .with_f64("velocity", read("v")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framebind_api_core::{EventState, IdentityTranslator};

    struct Halve;

    impl ResolutionTranslator for Halve {
        fn native_to_web(&self, value: f64) -> f64 {
            value / 2.0
        }

        fn web_to_native(&self, value: f64) -> f64 {
            value * 2.0
        }
    }

    #[test]
    fn pan_keeps_internal_values_in_device_units() {
        let mut scope = Scope::with_constants();
        let update = PanUpdate {
            dx: 30.0,
            dy: 15.0,
            step_x: 10.0,
            step_y: -4.0,
            ..PanUpdate::default()
        };
        write_pan(&mut scope, &Halve, &update);
        assert_eq!(scope.get_f64("x"), Some(15.0));
        assert_eq!(scope.get_f64("internal_x"), Some(30.0));
        assert_eq!(scope.get_f64("internal_y"), Some(15.0));
        assert_eq!(scope.get_f64("dy"), Some(-2.0));
        assert!(scope.contains("PI"));

        let payload = payload_fields(
            EventKind::Pan,
            &scope,
            &Halve,
            EventPayload::new(EventState::Exit, "t"),
        );
        assert_eq!(payload.get_f64("deltaX"), Some(15.0));
        assert_eq!(payload.get_f64("deltaY"), Some(7.5));
    }

    #[test]
    fn scroll_payload_reports_logical_offsets() {
        let mut scope = Scope::new();
        let update = ScrollUpdate {
            x: 0.0,
            y: 200.0,
            dy: 20.0,
            tdy: 60.0,
            ..ScrollUpdate::default()
        };
        write_scroll(&mut scope, &Halve, &update);
        assert_eq!(scope.get_f64("internal_y"), Some(200.0));
        let payload = payload_fields(
            EventKind::Scroll,
            &scope,
            &Halve,
            EventPayload::new(EventState::End, "t"),
        );
        assert_eq!(payload.get_f64("y"), Some(100.0));
        assert_eq!(payload.get_f64("dy"), Some(10.0));
        assert_eq!(payload.get_f64("tdy"), Some(30.0));
    }

    #[test]
    fn unmeasured_kinds_report_zero() {
        let payload = payload_fields(
            EventKind::Spring,
            &Scope::new(),
            &IdentityTranslator,
            EventPayload::new(EventState::Start, "t"),
        );
        assert_eq!(payload.get_f64("position"), Some(0.0));
        assert_eq!(payload.get_f64("velocity"), Some(0.0));
    }
}
