//! Shared fixtures for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use graphbench::sdk::{
    ClientError, ClientResult, ElementType, EmbeddedClient, GraphClient, GraphValue, IndexAdmin,
    NodeId, Traversal,
};
use graphbench::{DatasetBuilder, Parameters, TimeInterval};

/// A small IMDb-shaped graph with known answers for every query.
///
/// Writers cover zero (eve), one (wil), two (wes) and three (wyn) credits.
pub struct ImdbFixture {
    pub client: EmbeddedClient,
    pub alpha: NodeId,
    pub beta: NodeId,
    pub gamma: NodeId,
    pub delta: NodeId,
    pub epsilon: NodeId,
    pub ann: NodeId,
    pub bob: NodeId,
    pub cid: NodeId,
    pub dan: NodeId,
    pub eve: NodeId,
    pub nia: NodeId,
    pub wes: NodeId,
    pub wil: NodeId,
    pub wyn: NodeId,
}

impl ImdbFixture {
    pub async fn new() -> Self {
        let client = EmbeddedClient::new();
        let mut store = client.store_write().await;
        let mut b = DatasetBuilder::new(&mut store);

        let alpha = b.title("Alpha", 1985, 1985);
        let beta = b.title("Beta", 1990, 1990);
        let gamma = b.title("Gamma", 1999, 1999);
        let delta = b.title("Delta", 2005, 2005);
        let epsilon = b.title("Epsilon", 1975, 1975);

        let drama = b.genre("Drama");
        let comedy = b.genre("Comedy");
        let horror = b.genre("Horror");

        let ann = b.person("Ann", &["actor"]);
        let bob = b.person("Bob", &["director"]);
        let cid = b.person("Cid", &["director"]);
        let dan = b.person("Dan", &["actor"]);
        let eve = b.person("Eve", &["actor", "writer"]);
        let nia = b.person("Nia", &["actor"]);
        let wes = b.person("Wes", &["writer"]);
        let wil = b.person("Wil", &["writer"]);
        let wyn = b.person("Wyn", &["writer"]);

        b.has_genre(alpha, drama).unwrap();
        b.has_genre(alpha, comedy).unwrap();
        b.has_genre(beta, drama).unwrap();
        b.has_genre(gamma, horror).unwrap();
        b.has_genre(delta, comedy).unwrap();

        b.known_for(ann, alpha).unwrap();
        b.known_for(ann, beta).unwrap();
        b.known_for(ann, gamma).unwrap();
        b.known_for(dan, delta).unwrap();
        b.known_for(eve, alpha).unwrap();

        b.directed(bob, alpha).unwrap();
        b.directed(bob, beta).unwrap();
        b.directed(cid, gamma).unwrap();
        b.directed(cid, delta).unwrap();
        b.directed(cid, epsilon).unwrap();

        b.wrote(wes, alpha).unwrap();
        b.wrote(wes, beta).unwrap();
        b.wrote(wil, gamma).unwrap();
        b.wrote(wyn, alpha).unwrap();
        b.wrote(wyn, gamma).unwrap();
        b.wrote(wyn, delta).unwrap();

        drop(store);
        Self {
            client,
            alpha,
            beta,
            gamma,
            delta,
            epsilon,
            ann,
            bob,
            cid,
            dan,
            eve,
            nia,
            wes,
            wil,
            wyn,
        }
    }

    /// Parameters pointing at ann, bob, wes and alpha, over 1980..=2001
    pub fn params(&self) -> Parameters {
        Parameters {
            actor_id: self.ann.to_string(),
            director_id: self.bob.to_string(),
            writer_id: self.wes.to_string(),
            movie_id: self.alpha.to_string(),
            time_interval: TimeInterval {
                start_year: 1980,
                end_year: 2001,
            },
        }
    }
}

/// Collect string values, panicking on anything else
pub fn strings(values: Vec<GraphValue>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| match v {
            GraphValue::String(s) => s,
            other => panic!("expected a string, got {:?}", other),
        })
        .collect()
}

/// What the next `execute` call does
#[derive(Debug, Clone)]
pub enum Scripted {
    Pass,
    Fail(&'static str),
    Disconnect,
    Sleep(Duration),
}

/// Wraps an embedded client and replays a script of failures and delays.
///
/// Calls past the end of the script pass through to the embedded store.
pub struct ScriptedClient {
    inner: EmbeddedClient,
    script: Mutex<VecDeque<Scripted>>,
    executed: Mutex<Vec<String>>,
    indexes: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl ScriptedClient {
    pub fn new(inner: EmbeddedClient) -> Self {
        Self {
            inner,
            script: Mutex::new(VecDeque::new()),
            executed: Mutex::new(Vec::new()),
            indexes: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_script(self, script: Vec<Scripted>) -> Self {
        *self.script.lock().unwrap() = script.into();
        self
    }

    /// Gremlin of every traversal executed so far, in call order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn indexes(&self) -> Vec<String> {
        self.indexes.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &EmbeddedClient {
        &self.inner
    }
}

#[async_trait]
impl GraphClient for ScriptedClient {
    async fn execute(&self, traversal: &Traversal) -> ClientResult<Vec<GraphValue>> {
        self.executed.lock().unwrap().push(traversal.to_gremlin());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Pass);
        match next {
            Scripted::Pass => self.inner.execute(traversal).await,
            Scripted::Fail(message) => Err(ClientError::QueryError(message.to_string())),
            Scripted::Disconnect => Err(ClientError::ConnectionError(
                "connection reset by peer".to_string(),
            )),
            Scripted::Sleep(delay) => {
                tokio::time::sleep(delay).await;
                self.inner.execute(traversal).await
            }
        }
    }

    async fn ping(&self) -> ClientResult<()> {
        self.inner.ping().await
    }

    async fn close(&self) -> ClientResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.inner.close().await
    }
}

#[async_trait]
impl IndexAdmin for ScriptedClient {
    async fn create_index(&self, element: ElementType, property_key: &str) -> ClientResult<()> {
        self.indexes.lock().unwrap().push(property_key.to_string());
        self.inner.create_index(element, property_key).await
    }
}

/// Read one HTTP request (headers plus a `Content-Length` body)
async fn read_request(stream: &mut tokio::net::TcpStream) -> std::io::Result<()> {
    use tokio::io::AsyncReadExt;
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return Ok(());
            }
        }
    }
}

/// A Gremlin endpoint that answers the connect-time ping and then hangs up
/// on every later request without a response. Returns its port.
pub async fn ping_then_hang_up() -> u16 {
    use tokio::io::AsyncWriteExt;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut answered = false;
        while let Ok((mut stream, _)) = listener.accept().await {
            let _ = read_request(&mut stream).await;
            if !answered {
                answered = true;
                let body = r#"{"status":{"code":200},"result":{"data":[1]}}"#;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        }
    });
    port
}
