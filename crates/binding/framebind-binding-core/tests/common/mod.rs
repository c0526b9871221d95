#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use framebind_api_core::{ExpressionEvaluator, Platform, ViewHandle};
use framebind_binding_core::{BindingCore, CoreConfig};
use framebind_test_fixtures::doubles::{
    CountingEvaluator, EventRecorder, RecordingViewUpdater, StaticViewFinder,
};

pub const BOX: ViewHandle = ViewHandle(1);
pub const DIAL: ViewHandle = ViewHandle(2);
pub const PHOTO: ViewHandle = ViewHandle(3);
pub const LIST: ViewHandle = ViewHandle(4);

pub struct Harness {
    pub core: BindingCore,
    pub updater: Arc<RecordingViewUpdater>,
    pub recorder: EventRecorder,
    pub evaluator: Arc<CountingEvaluator>,
}

pub fn finder() -> StaticViewFinder {
    StaticViewFinder::new()
        .with_view("box", BOX.0)
        .with_view("dial", DIAL.0)
        .with_view("photo", PHOTO.0)
        .with_view("list", LIST.0)
        .with_view("header", 5)
        .with_view("banner", 6)
        .with_view("card", 7)
}

pub fn harness() -> Harness {
    harness_with(CoreConfig::default())
}

pub fn harness_with(config: CoreConfig) -> Harness {
    let updater = Arc::new(RecordingViewUpdater::new());
    let evaluator = Arc::new(CountingEvaluator::new());
    let platform = Platform::new(Arc::new(finder()), updater.clone());
    let core = BindingCore::new(
        platform,
        evaluator.clone() as Arc<dyn ExpressionEvaluator>,
        config,
    );
    Harness {
        core,
        updater,
        recorder: EventRecorder::new(),
        evaluator,
    }
}

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// AST for `name > limit`.
pub fn greater_than(name: &str, limit: f64) -> String {
    format!(
        r#"{{"type":">","children":[{{"type":"Identifier","value":"{name}"}},{{"type":"NumericLiteral","value":{limit}}}]}}"#
    )
}

pub fn identifier(name: &str) -> String {
    format!(r#"{{"type":"Identifier","value":"{name}"}}"#)
}
