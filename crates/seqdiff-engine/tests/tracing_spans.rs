//! Tracing output of a diff pass, captured with a registry layer.

use std::sync::{Arc, Mutex};

use seqdiff_core::Value;
use seqdiff_engine::{DifferConfig, IterableDiffer};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Debug, Default)]
struct PassTraceState {
    check_spans: usize,
    has_len_hint_field: bool,
    messages: Vec<String>,
    pass_additions: Option<u64>,
}

struct PassTraceCapture {
    state: Arc<Mutex<PassTraceState>>,
}

impl<S> Layer<S> for PassTraceCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        if attrs.metadata().name() != "seqdiff.check" {
            return;
        }
        let mut state = self.state.lock().expect("pass trace state lock");
        state.check_spans += 1;
        state.has_len_hint_field |= attrs.metadata().fields().field("len_hint").is_some();
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        #[derive(Default)]
        struct PassVisitor {
            message: Option<String>,
            additions: Option<u64>,
        }
        impl tracing::field::Visit for PassVisitor {
            fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
                if field.name() == "additions" {
                    self.additions = Some(value);
                }
            }

            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_owned());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_owned());
                }
            }
        }

        let mut visitor = PassVisitor::default();
        event.record(&mut visitor);
        let mut state = self.state.lock().expect("pass trace state lock");
        if let Some(message) = visitor.message {
            if message == "iterable pass" {
                state.pass_additions = visitor.additions;
            }
            state.messages.push(message);
        }
    }
}

fn capture<F: FnOnce()>(run: F) -> Arc<Mutex<PassTraceState>> {
    let state = Arc::new(Mutex::new(PassTraceState::default()));
    let subscriber = tracing_subscriber::registry().with(PassTraceCapture {
        state: Arc::clone(&state),
    });
    tracing::subscriber::with_default(subscriber, || {
        tracing::callsite::rebuild_interest_cache();
        run();
    });
    state
}

#[test]
fn every_pass_opens_a_check_span() {
    let state = capture(|| {
        let mut differ = IterableDiffer::for_values();
        differ.check(&Value::list(["a", "b"])).expect("list");
        differ.check(&Value::list(["b"])).expect("list");
    });

    let snapshot = state.lock().expect("pass trace state lock");
    assert_eq!(snapshot.check_spans, 2, "expected one seqdiff.check span per pass");
    assert!(snapshot.has_len_hint_field, "seqdiff.check missing len_hint");
}

#[test]
fn pass_event_carries_counts() {
    let state = capture(|| {
        let mut differ = IterableDiffer::by_value();
        differ.check_items([1, 2, 3]);
    });

    let snapshot = state.lock().expect("pass trace state lock");
    assert!(snapshot.messages.iter().any(|m| m == "iterable pass"));
    assert_eq!(snapshot.pass_additions, Some(3));
}

#[test]
fn trace_passes_adds_debug_event_for_dirty_passes() {
    let state = capture(|| {
        let config = DifferConfig::default().with_trace_passes(true);
        let mut differ = IterableDiffer::with_config(seqdiff_core::ByValue, config);
        differ.check_items(["x"]);
        differ.check_items(["x"]);
    });

    let snapshot = state.lock().expect("pass trace state lock");
    let changed = snapshot
        .messages
        .iter()
        .filter(|m| *m == "iterable pass changed collection")
        .count();
    assert_eq!(changed, 1, "only the first pass changed anything");
}

#[test]
fn rejected_input_is_logged() {
    let state = capture(|| {
        let mut differ = IterableDiffer::for_values();
        assert!(differ.check(&Value::from("invalid")).is_err());
    });

    let snapshot = state.lock().expect("pass trace state lock");
    assert!(
        snapshot
            .messages
            .iter()
            .any(|m| m == "rejected non-iterable input")
    );
    assert_eq!(snapshot.check_spans, 0, "rejected input never starts a pass");
}
