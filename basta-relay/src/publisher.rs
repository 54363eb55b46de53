use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use basta_events::NormalizedEvent;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Prefix of the per-sale channels agents subscribe to.
pub const CHANNEL_PREFIX: &str = "agent:events";

pub fn sale_channel(sale_id: &str) -> String {
    format!("{CHANNEL_PREFIX}:{sale_id}")
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("message bus is not connected")]
    NotConnected,
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

/// Publish-only view of the message bus, shared by all requests.
#[async_trait]
pub trait EventPublisher {
    async fn publish(&self, channel: &str, payload: String) -> Result<(), PublishError>;

    fn is_connected(&self) -> bool;
}

/// Serialize a normalized event and publish it on `channel`.
pub async fn publish_event(
    publisher: &(dyn EventPublisher + Send + Sync),
    channel: &str,
    event: &NormalizedEvent,
) -> Result<(), PublishError> {
    let payload = serde_json::to_string(event)?;
    publisher.publish(channel, payload).await
}

/// Redis PUBLISH over a single connection manager. The connection is
/// established by [`RedisPublisher::connect`], publishing before that fails
/// with [`PublishError::NotConnected`].
///
/// `ConnectionManager` reconnects in the background, so the connection cell
/// alone cannot tell whether redis is reachable. `healthy` follows the last
/// round trip: a redis error clears it, the next successful publish sets it.
pub struct RedisPublisher {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    healthy: AtomicBool,
}

impl RedisPublisher {
    pub fn new(addr: &str) -> Result<RedisPublisher, PublishError> {
        let client = redis::Client::open(addr)?;

        Ok(RedisPublisher {
            client,
            connection: OnceCell::new(),
            healthy: AtomicBool::new(false),
        })
    }

    pub async fn connect(&self) -> Result<(), PublishError> {
        self.connection
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await?;
        self.healthy.store(true, Ordering::SeqCst);

        Ok(())
    }

    fn track<T>(&self, result: redis::RedisResult<T>) -> redis::RedisResult<T> {
        if let Err(e) = &result {
            if self.healthy.swap(false, Ordering::SeqCst) {
                tracing::warn!(error = %e, "redis connection lost");
            }
        } else {
            self.healthy.store(true, Ordering::SeqCst);
        }

        result
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, channel: &str, payload: String) -> Result<(), PublishError> {
        // ConnectionManager is a cheap handle over the shared multiplexed connection
        let mut conn = self
            .connection
            .get()
            .ok_or(PublishError::NotConnected)?
            .clone();

        let receivers: i64 = self.track(conn.publish(channel, payload).await)?;
        tracing::debug!(channel, receivers, "published to redis");

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.initialized() && self.healthy.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub channel: String,
    pub payload: String,
}

/// In-memory publisher recording every call, for tests.
#[derive(Clone)]
pub struct MockPublisher {
    connected: Arc<AtomicBool>,
    fail: bool,
    calls: Arc<Mutex<Vec<PublishedMessage>>>,
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(true)),
            fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disconnected() -> Self {
        let mock = Self::default();
        mock.set_connected(false);
        mock
    }

    /// Every publish fails, calls are still recorded.
    pub fn failing(&mut self) -> Self {
        self.fail = true;
        self.clone()
    }

    /// Shared by clones, so tests can flip it on a publisher already handed
    /// to the router.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<PublishedMessage>> {
        match self.calls.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn get_calls(&self) -> Vec<PublishedMessage> {
        self.lock_calls().clone()
    }
}

#[async_trait]
impl EventPublisher for MockPublisher {
    async fn publish(&self, channel: &str, payload: String) -> Result<(), PublishError> {
        self.lock_calls().push(PublishedMessage {
            channel: channel.to_owned(),
            payload,
        });

        if self.fail || !self.is_connected() {
            return Err(PublishError::NotConnected);
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
