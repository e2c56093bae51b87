//! Drives a `Client` against an in-memory peer.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::time::timeout;

use slirc_client::{Client, ClientConfig, Event, EventStream, SendType};

struct Peer {
    reader: BufReader<tokio::io::ReadHalf<DuplexStream>>,
    writer: tokio::io::WriteHalf<DuplexStream>,
}

impl Peer {
    async fn expect_line(&mut self) -> String {
        let mut line = String::new();
        timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for client line")
            .expect("read failed");
        line.trim_end().to_string()
    }

    async fn say(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .unwrap();
    }
}

fn start(send_delay: Duration) -> (Client, EventStream, Peer) {
    let (client_side, server_side) = tokio::io::duplex(4096);
    let mut config = ClientConfig::new(vec!["loopback".into()], 6667, "decbot", "Dec Bot");
    config.send_delay = send_delay;
    let (client, events) = Client::from_stream(client_side, config);
    let (read, write) = tokio::io::split(server_side);
    let peer = Peer {
        reader: BufReader::new(read),
        writer: write,
    };
    (client, events, peer)
}

async fn next_matching(events: &mut EventStream, pred: impl Fn(&Event) -> bool) -> Event {
    loop {
        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event stream ended");
        if pred(&event) {
            return event;
        }
    }
}

#[tokio::test]
async fn test_login_and_registration() {
    let (client, mut events, mut peer) = start(Duration::ZERO);

    client.login("decbot", "Dec Bot").unwrap();
    assert_eq!(peer.expect_line().await, "NICK decbot");
    assert_eq!(peer.expect_line().await, "USER decbot 0 * :Dec Bot");

    peer.say(":srv 433 * decbot :Nickname is already in use").await;
    assert_eq!(peer.expect_line().await, "NICK decbot_");

    peer.say(":srv 001 decbot_ :Welcome").await;
    let event = next_matching(&mut events, |e| matches!(e, Event::Registered { .. })).await;
    assert_eq!(
        event,
        Event::Registered {
            nickname: "decbot_".into()
        }
    );
    assert_eq!(client.nickname(), "decbot_");
}

#[tokio::test]
async fn test_ping_and_roster() {
    let (client, mut events, mut peer) = start(Duration::ZERO);

    peer.say("PING :srv").await;
    assert_eq!(peer.expect_line().await, "PONG srv");

    peer.say(":srv 001 decbot :Welcome").await;
    peer.say(":decbot!bot@bot.host JOIN #chan").await;
    assert_eq!(peer.expect_line().await, "WHO #chan");
    peer.say(":srv 353 decbot = #chan :decbot @alice").await;
    peer.say(":srv 352 decbot #chan ~al alice.host srv alice H@ :0 Alice")
        .await;
    peer.say(":alice!~al@alice.host MODE #chan +o decbot").await;

    next_matching(&mut events, |e| matches!(e, Event::OpGranted { .. })).await;
    assert_eq!(client.joined_channels(), vec!["#chan".to_string()]);
    let alice = client.channel_user("#chan", "ALICE").unwrap();
    assert!(alice.is_op);
    assert_eq!(alice.ident.as_deref(), Some("~al"));
    assert!(client.channel_user("#chan", "decbot").unwrap().is_op);
    assert_eq!(client.channel_users("#chan").len(), 2);
}

#[tokio::test]
async fn test_outbound_helpers() {
    let (client, mut events, mut peer) = start(Duration::ZERO);

    client.send(SendType::Message, "#chan", "hi there").unwrap();
    client.send(SendType::Action, "#chan", "waves").unwrap();
    client.op("#chan", "alice").unwrap();
    client.part("#chan", Some("Cycling.")).unwrap();
    client.write_line("TOPIC #chan :new\r\nQUIT").unwrap();

    assert_eq!(peer.expect_line().await, "PRIVMSG #chan :hi there");
    assert_eq!(peer.expect_line().await, "PRIVMSG #chan :\x01ACTION waves\x01");
    assert_eq!(peer.expect_line().await, "MODE #chan +o alice");
    assert_eq!(peer.expect_line().await, "PART #chan :Cycling.");
    assert_eq!(peer.expect_line().await, "TOPIC #chan :new");

    let written = next_matching(&mut events, |e| matches!(e, Event::LineWritten(_))).await;
    assert_eq!(written, Event::LineWritten("PRIVMSG #chan :hi there".into()));
}

#[tokio::test(start_paused = true)]
async fn test_send_delay_paces_lines() {
    let (client, _events, mut peer) = start(Duration::from_millis(400));
    let started = tokio::time::Instant::now();

    client.join("#a").unwrap();
    client.join("#b").unwrap();
    client.join("#c").unwrap();
    for chan in ["#a", "#b", "#c"] {
        assert_eq!(peer.expect_line().await, format!("JOIN {chan}"));
    }
    assert!(started.elapsed() >= Duration::from_millis(800));
}

#[tokio::test]
async fn test_server_error_disconnects_once() {
    let (client, mut events, mut peer) = start(Duration::ZERO);

    peer.say("ERROR :Closing Link: decbot (Killed)").await;
    drop(peer);

    let event = next_matching(&mut events, |e| matches!(e, Event::Disconnected { .. })).await;
    assert_eq!(
        event,
        Event::Disconnected {
            reason: Some("Closing Link: decbot (Killed)".into())
        }
    );
    assert!(!client.is_connected());
    assert!(client.join("#chan").is_err());
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_disconnect_flushes_quit() {
    let (client, mut events, mut peer) = start(Duration::ZERO);

    client.quit(Some("bye")).unwrap();
    client.disconnect();
    client.disconnect();

    assert_eq!(peer.expect_line().await, "QUIT :bye");
    let mut rest = String::new();
    let n = peer.reader.read_line(&mut rest).await.unwrap();
    assert_eq!(n, 0, "socket should be closed after QUIT");

    next_matching(&mut events, |e| matches!(e, Event::Disconnected { .. })).await;
}
