use console_core::notification::{CONNECTION_LOST, SEND_FAILED};
use console_core::{
    CommandDispatcher, ConnectionState, DispatchError, Notification, NotificationKind,
    NotificationSink, SharedConnectionState, StrategyRequest, Transport, TransportError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingTransport {
    frames: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingTransport {
    fn failing() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn frames(&self) -> Vec<String> {
        self.frames.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn send_text(&self, frame: String) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Socket("simulated reset".to_string()));
        }
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

struct Harness {
    state: SharedConnectionState,
    transport: Arc<RecordingTransport>,
    sink: Arc<RecordingSink>,
    dispatcher: CommandDispatcher,
}

fn harness(initial: ConnectionState, transport: RecordingTransport) -> Harness {
    let state = SharedConnectionState::new();
    state.set(initial);
    let transport = Arc::new(transport);
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = CommandDispatcher::new(
        Arc::new(state.clone()),
        transport.clone(),
        sink.clone(),
    );
    Harness {
        state,
        transport,
        sink,
        dispatcher,
    }
}

fn sample_request() -> StrategyRequest {
    let mut params = serde_json::Map::new();
    params.insert("split_date".to_string(), json!("2021-06-01"));
    StrategyRequest::new("SplitBundleDate")
        .with_path("data_bundle/split")
        .with_params(params)
}

#[test]
fn open_connection_sends_one_envelope_and_stays_silent() {
    let h = harness(ConnectionState::Open, RecordingTransport::default());

    h.dispatcher.dispatch(&sample_request());

    let frames = h.transport.frames();
    assert_eq!(frames.len(), 1);
    let sent: Value = serde_json::from_str(&frames[0]).unwrap();
    assert_eq!(
        sent,
        json!({
            "command": "execute_strategy",
            "strategy": {
                "strategy_name": "SplitBundleDate",
                "strategy_path": "data_bundle/split",
                "param_config": { "split_date": "2021-06-01" }
            }
        })
    );
    assert!(h.sink.seen().is_empty());
}

#[test]
fn non_open_states_notify_once_and_send_nothing() {
    for state in [
        ConnectionState::Connecting,
        ConnectionState::Closing,
        ConnectionState::Closed,
    ] {
        let h = harness(state, RecordingTransport::default());

        h.dispatcher.dispatch(&sample_request());

        assert!(h.transport.frames().is_empty(), "state {state} must not send");
        assert_eq!(h.sink.seen(), vec![Notification::error(CONNECTION_LOST)]);
    }
}

#[test]
fn transport_failure_notifies_with_distinct_message() {
    let h = harness(ConnectionState::Open, RecordingTransport::failing());

    h.dispatcher.dispatch(&sample_request());

    assert!(h.transport.frames().is_empty());
    let seen = h.sink.seen();
    assert_eq!(seen, vec![Notification::error(SEND_FAILED)]);
    assert_eq!(seen[0].kind, NotificationKind::Error);
    assert_ne!(seen[0].message, CONNECTION_LOST);
}

#[test]
fn state_is_read_on_every_call() {
    let h = harness(ConnectionState::Closed, RecordingTransport::default());
    let request = sample_request();

    h.dispatcher.dispatch(&request);
    assert!(h.transport.frames().is_empty());

    h.state.set(ConnectionState::Open);
    h.dispatcher.dispatch(&request);
    assert_eq!(h.transport.frames().len(), 1);
    assert_eq!(h.sink.seen().len(), 1);
}

#[test]
fn repeated_dispatch_is_not_deduplicated() {
    let h = harness(ConnectionState::Open, RecordingTransport::default());
    let request = sample_request();

    h.dispatcher.dispatch(&request);
    h.dispatcher.dispatch(&request);

    let frames = h.transport.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], frames[1]);
}

#[test]
fn try_dispatch_reports_the_failure_kind() {
    let h = harness(ConnectionState::Connecting, RecordingTransport::default());
    match h.dispatcher.try_dispatch(&sample_request()) {
        Err(DispatchError::ConnectionNotReady { state }) => {
            assert_eq!(state, ConnectionState::Connecting)
        }
        other => panic!("expected not ready, got {other:?}"),
    }
    // try_dispatch leaves notifying to the caller.
    assert!(h.sink.seen().is_empty());

    let h = harness(ConnectionState::Open, RecordingTransport::failing());
    assert!(matches!(
        h.dispatcher.try_dispatch(&sample_request()),
        Err(DispatchError::TransmissionFailure(TransportError::Socket(_)))
    ));
}

#[test]
fn fixed_state_and_closure_sink_work_as_dependencies() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_sink = Arc::clone(&seen);
    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = CommandDispatcher::new(
        Arc::new(ConnectionState::Closing),
        transport.clone(),
        Arc::new(move |n: Notification| seen_by_sink.lock().unwrap().push(n)),
    );

    dispatcher.dispatch(&StrategyRequest::new("CombineDataBundles"));

    assert!(transport.frames().is_empty());
    assert_eq!(seen.lock().unwrap().len(), 1);
}
