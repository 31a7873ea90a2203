use serde_json::json;
use std::net::TcpStream;
use std::time::{Duration, Instant};
use strategy_engine_stub::spawn_engine;
use strategy_protocol::{ClientCommand, ErrorCode, ServerMessage, StrategyRequest};
use tungstenite::Message;

fn read_server_message(
    ws: &mut tungstenite::WebSocket<TcpStream>,
    recorder: &mut strategy_engine_stub::Recorder,
    timeout: Duration,
) -> ServerMessage {
    let deadline = Instant::now() + timeout;
    loop {
        recorder.tick();
        match ws.read() {
            Ok(Message::Text(s)) => return serde_json::from_str(&s).expect("valid server json"),
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => panic!("ws read failed: {e:?}"),
        }
        if Instant::now() >= deadline {
            panic!("timeout waiting for server message");
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn execute_strategy_is_recorded_and_accepted() {
    let (net, mut recorder) = spawn_engine("127.0.0.1:0").expect("spawn engine");
    let addr = net.listen_addr();

    let stream = TcpStream::connect(addr).expect("tcp connect");
    let _ = stream.set_read_timeout(Some(Duration::from_millis(50)));
    let _ = stream.set_write_timeout(Some(Duration::from_millis(200)));
    let (mut ws, _) = tungstenite::client(format!("ws://{addr}"), stream).expect("ws connect");

    let mut params = serde_json::Map::new();
    params.insert("feature_set_configs".to_string(), json!([]));
    let request = StrategyRequest::new("CreateFeatureSets")
        .with_path("data_bundle/features")
        .with_params(params);
    let cmd = ClientCommand::execute(request.clone());
    ws.send(Message::Text(serde_json::to_string(&cmd).unwrap()))
        .unwrap();

    let reply = read_server_message(&mut ws, &mut recorder, Duration::from_secs(2));
    match reply {
        ServerMessage::Accepted { strategy_name } => assert_eq!(strategy_name, "CreateFeatureSets"),
        other => panic!("expected accepted, got: {other:?}"),
    }

    assert!(recorder.is_client_connected());
    assert_eq!(recorder.received(), &[cmd]);
    assert_eq!(recorder.received()[0].strategy(), &request);

    net.shutdown();
}

#[test]
fn malformed_frame_is_rejected_without_recording() {
    let (net, mut recorder) = spawn_engine("127.0.0.1:0").expect("spawn engine");
    let addr = net.listen_addr();

    let stream = TcpStream::connect(addr).expect("tcp connect");
    let _ = stream.set_read_timeout(Some(Duration::from_millis(50)));
    let (mut ws, _) = tungstenite::client(format!("ws://{addr}"), stream).expect("ws connect");

    ws.send(Message::Text(r#"{"command":"drop_tables"}"#.to_string()))
        .unwrap();

    let reply = read_server_message(&mut ws, &mut recorder, Duration::from_secs(2));
    match reply {
        ServerMessage::Error { code, .. } => assert_eq!(code, ErrorCode::InvalidCommand),
        other => panic!("expected invalid command error, got: {other:?}"),
    }
    recorder.tick();
    assert!(recorder.received().is_empty());

    net.shutdown();
}
