//! Helper functions for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use messenger_status::config::{ProbeConfig, StatsConfig, StorageConfig};
use messenger_status::storage::memory::MemoryStatsSource;
use messenger_status::storage::{
    ClientInfo, CurrentCounter, HourlyStatsRow, StatsSource, StorageError, StorageResult,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// How a fake messenger server treats each connection
#[derive(Debug, Clone, Copy)]
pub enum Peer {
    /// Answer the greeting after `delay`, then hold the connection open
    Respond { delay: Duration },
    /// Read the greeting, send nothing for `silence`, then close
    SilentThenClose { silence: Duration },
    /// Read the greeting and never answer or close
    Silent,
    /// Close right after reading the greeting
    Close,
}

/// A fake messenger server on a loopback port
pub struct FakeServer {
    pub port: u16,
    /// Every greeting received, in order
    pub greetings: mpsc::UnboundedReceiver<Vec<u8>>,
}

pub async fn spawn_fake_server(peer: Peer) -> FakeServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (greeting_tx, greetings) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            let greeting_tx = greeting_tx.clone();
            tokio::spawn(handle_connection(socket, peer, greeting_tx));
        }
    });

    FakeServer { port, greetings }
}

async fn handle_connection(mut socket: TcpStream, peer: Peer, greeting_tx: mpsc::UnboundedSender<Vec<u8>>) {
    let mut greeting = Vec::new();
    let mut chunk = [0u8; 64];
    while !greeting.ends_with(b"\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => greeting.extend_from_slice(&chunk[..n]),
        }
    }
    let _ = greeting_tx.send(greeting);

    match peer {
        Peer::Respond { delay } => {
            tokio::time::sleep(delay).await;
            let _ = socket.write_all(b"VER 1 MSNP15\r\n").await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Peer::SilentThenClose { silence } => {
            tokio::time::sleep(silence).await;
        }
        Peer::Silent => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Peer::Close => {}
    }
}

/// A loopback port nothing listens on
pub async fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn probe_config(port: u16, timeout_secs: u64) -> ProbeConfig {
    ProbeConfig {
        host: "127.0.0.1".to_string(),
        port,
        interval: 120,
        timeout: timeout_secs,
        slow_after: None,
    }
}

pub fn stats_config() -> StatsConfig {
    StatsConfig {
        interval: 300,
        window_hours: 24,
        fresh_for: 300,
        storage: StorageConfig::None,
    }
}

pub fn hourly_row(hour: i64, client_id: i64, users_active: i64) -> HourlyStatsRow {
    HourlyStatsRow {
        hour,
        client_id,
        users_active,
        messages_sent: users_active * 10,
        messages_received: users_active * 11,
    }
}

/// Poll `check` until it holds or `attempts` run out
pub async fn eventually(attempts: usize, mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..attempts {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

/// Memory source whose reads can be switched to fail
#[derive(Default)]
pub struct FlakySource {
    pub inner: MemoryStatsSource,
    failing: AtomicBool,
}

impl FlakySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("database is locked".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StatsSource for FlakySource {
    async fn current_counter(&self, key: &str) -> StorageResult<Option<CurrentCounter>> {
        self.check()?;
        self.inner.current_counter(key).await
    }

    async fn clients(&self) -> StorageResult<HashMap<i64, ClientInfo>> {
        self.check()?;
        self.inner.clients().await
    }

    async fn hourly_stats_since(&self, threshold_hour: i64) -> StorageResult<Vec<HourlyStatsRow>> {
        self.check()?;
        self.inner.hourly_stats_since(threshold_hour).await
    }

    fn describe(&self) -> String {
        "flaky test source".to_string()
    }
}

/// Source whose reads never complete, for cancellation tests
pub struct StalledSource;

#[async_trait]
impl StatsSource for StalledSource {
    async fn current_counter(&self, _key: &str) -> StorageResult<Option<CurrentCounter>> {
        std::future::pending().await
    }

    async fn clients(&self) -> StorageResult<HashMap<i64, ClientInfo>> {
        std::future::pending().await
    }

    async fn hourly_stats_since(&self, _threshold_hour: i64) -> StorageResult<Vec<HourlyStatsRow>> {
        std::future::pending().await
    }

    fn describe(&self) -> String {
        "stalled test source".to_string()
    }
}
