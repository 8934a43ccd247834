use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_test::assert_ok;

use memory_game::adapter::{
    build_observation, create_ack, create_hello, create_reveal, run_server, ClientCommand,
    InboundCommand, InboundPayload, OutboundMessage, ServerConfig, PROTOCOL_VERSION,
};
use memory_game::core::{Board, GameController};
use memory_game::types::CardKind;

type LineReader = Lines<BufReader<OwnedReadHalf>>;

fn config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

async fn start(
    queue: usize,
) -> (
    SocketAddr,
    mpsc::Receiver<InboundCommand>,
    mpsc::UnboundedSender<OutboundMessage>,
    JoinHandle<()>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(queue);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(config(), cmd_tx, out_rx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    (addr, cmd_rx, out_tx, server_handle)
}

async fn connect(addr: SocketAddr) -> (LineReader, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, write_half) = stream.into_split();
    (BufReader::new(read_half).lines(), write_half)
}

async fn send<T: serde::Serialize>(w: &mut OwnedWriteHalf, msg: &T) {
    let line = serde_json::to_string(msg).unwrap();
    assert_ok!(w.write_all(line.as_bytes()).await);
    assert_ok!(w.write_all(b"\n").await);
    assert_ok!(w.flush().await);
}

async fn read_json(lines: &mut LineReader) -> serde_json::Value {
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timeout waiting for line")
        .expect("io error")
        .expect("connection closed");
    serde_json::from_str(&line).expect("invalid json")
}

async fn hello(
    w: &mut OwnedWriteHalf,
    lines: &mut LineReader,
    name: &str,
    stream: bool,
) -> serde_json::Value {
    let mut msg = create_hello(1, name, PROTOCOL_VERSION);
    msg.requested.stream_observations = stream;
    send(w, &msg).await;
    let welcome = read_json(lines).await;
    assert_eq!(welcome["type"], "welcome", "got {welcome}");
    welcome
}

/// A tiny game loop over a fixed board, the way the binary drives one.
fn spawn_game(
    mut cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
) -> JoinHandle<()> {
    use CardKind::{Potato, Rocket};

    tokio::spawn(async move {
        let board = Board::from_kinds(&[Rocket, Potato, Rocket, Potato]).unwrap();
        let mut game = GameController::with_board(board, 3);
        game.initialize();
        let mut seq = 0;

        while let Some(inbound) = cmd_rx.recv().await {
            seq += 1;
            match inbound.payload {
                InboundPayload::SnapshotRequest => {
                    let obs = build_observation(&game.snapshot(), seq, None);
                    let _ = out_tx.send(OutboundMessage::ToClientObservation {
                        client_id: inbound.client_id,
                        obs,
                    });
                }
                InboundPayload::Command(cmd) => {
                    for action in cmd.actions() {
                        game.apply_action(action);
                    }
                    let _ = out_tx.send(OutboundMessage::ToClientAck {
                        client_id: inbound.client_id,
                        ack: create_ack(inbound.seq),
                    });
                    let event = game.take_last_event();
                    let obs = build_observation(&game.snapshot(), seq, event);
                    let _ = out_tx.send(OutboundMessage::BroadcastObservation { obs });
                }
            }
        }
    })
}

#[tokio::test]
async fn adapter_hello_reveal_ack_and_observation() {
    let (addr, cmd_rx, out_tx, server_handle) = start(8).await;
    let game_handle = spawn_game(cmd_rx, out_tx);

    let (mut lines, mut w) = connect(addr).await;
    let welcome = hello(&mut w, &mut lines, "e2e", true).await;
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["game_id"], "memory-game");
    assert_eq!(welcome["protocol_version"], PROTOCOL_VERSION);

    // Streaming clients get the current state right after welcome.
    let obs = read_json(&mut lines).await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["cards"].as_array().unwrap().len(), 4);
    assert_eq!(obs["cards"][0]["tile"], "back");
    assert_eq!(obs["message"], "Memory Game");

    send(&mut w, &create_reveal(2, 0)).await;
    let ack = read_json(&mut lines).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);

    let obs = read_json(&mut lines).await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["pending"], 0);
    assert_eq!(obs["cards"][0]["state"], "face_up");
    assert_eq!(obs["cards"][0]["tile"], "rocket");
    // Face-down cards never leak their kind.
    assert_eq!(obs["cards"][2]["tile"], "back");
    assert_eq!(obs["last_event"]["kind"], "revealed");

    // Batched reveal completes the pair.
    let cmd = serde_json::json!({
        "type": "command", "seq": 3, "ts": 0, "action": "reveal", "indices": [2]
    });
    send(&mut w, &cmd).await;
    assert_eq!(read_json(&mut lines).await["type"], "ack");
    let obs = read_json(&mut lines).await;
    assert_eq!(obs["matched_pairs"], 1);
    assert_eq!(obs["message"], "Match found");
    assert_eq!(obs["cards"][2]["state"], "matched");

    server_handle.abort();
    game_handle.abort();
}

#[tokio::test]
async fn adapter_command_is_forwarded_as_reveal() {
    let (addr, mut cmd_rx, _out_tx, server_handle) = start(8).await;

    let (mut lines, mut w) = connect(addr).await;
    hello(&mut w, &mut lines, "fwd", false).await;

    send(&mut w, &create_reveal(2, 7)).await;
    let inbound = tokio::time::timeout(Duration::from_secs(2), cmd_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(inbound.seq, 2);
    match inbound.payload {
        InboundPayload::Command(ClientCommand::Reveal(list)) => assert_eq!(list.as_slice(), &[7]),
        other => panic!("unexpected payload {:?}", other),
    }

    server_handle.abort();
}

#[tokio::test]
async fn adapter_rejects_command_before_hello() {
    let (addr, _cmd_rx, _out_tx, server_handle) = start(8).await;

    let (mut lines, mut w) = connect(addr).await;
    send(&mut w, &create_reveal(1, 0)).await;
    let err = read_json(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");

    server_handle.abort();
}

#[tokio::test]
async fn adapter_rejects_protocol_mismatch() {
    let (addr, _cmd_rx, _out_tx, server_handle) = start(8).await;

    let (mut lines, mut w) = connect(addr).await;
    send(&mut w, &create_hello(1, "old", "9.0.0")).await;
    let err = read_json(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "protocol_mismatch");

    server_handle.abort();
}

#[tokio::test]
async fn adapter_second_client_is_observer() {
    let (addr, _cmd_rx, _out_tx, server_handle) = start(8).await;

    let (mut lines1, mut w1) = connect(addr).await;
    let welcome1 = hello(&mut w1, &mut lines1, "first", false).await;
    assert_eq!(welcome1["role"], "controller");

    let (mut lines2, mut w2) = connect(addr).await;
    let welcome2 = hello(&mut w2, &mut lines2, "second", false).await;
    assert_eq!(welcome2["role"], "observer");
    assert_eq!(welcome2["controller_id"], welcome1["client_id"]);

    send(&mut w2, &create_reveal(2, 0)).await;
    let err = read_json(&mut lines2).await;
    assert_eq!(err["code"], "not_controller");
    assert_eq!(err["seq"], 2);

    server_handle.abort();
}

#[tokio::test]
async fn adapter_rejects_stale_seq_and_bad_json() {
    let (addr, _cmd_rx, _out_tx, server_handle) = start(8).await;

    let (mut lines, mut w) = connect(addr).await;
    hello(&mut w, &mut lines, "seq", false).await;

    send(&mut w, &create_reveal(1, 0)).await;
    let err = read_json(&mut lines).await;
    assert_eq!(err["code"], "invalid_command");

    assert_ok!(w.write_all(b"{\"type\":\"command\",\"seq\":5,\n").await);
    let err = read_json(&mut lines).await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 5);

    server_handle.abort();
}

#[tokio::test]
async fn adapter_reports_backpressure_when_queue_full() {
    // Nobody drains the queue, so the second command overflows it.
    let (addr, _cmd_rx, _out_tx, server_handle) = start(1).await;

    let (mut lines, mut w) = connect(addr).await;
    hello(&mut w, &mut lines, "bp", false).await;

    send(&mut w, &create_reveal(2, 0)).await;
    send(&mut w, &create_reveal(3, 1)).await;

    let err = read_json(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "backpressure");
    assert_eq!(err["seq"], 3);

    server_handle.abort();
}
