// In-process stand-in for the broker transport.
// The control plane treats this crate as opaque: it owns client connection
// identity and lifecycle, delivers typed control requests to a registered
// handler, and exposes fan-out rooms for the live overview surface.
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, TransportError>;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("unknown control subject: {0}")]
    UnknownSubject(String),
    #[error("malformed control payload: {0}")]
    BadPayload(#[from] serde_json::Error),
    #[error("connection is not known to the transport: {0}")]
    UnknownConnection(ConnectionId),
}

const DEFAULT_ROOM_CAPACITY: usize = 64;

/// Opaque identifier for a live client connection.
///
/// The control plane compares these for equality only; their contents and
/// lifecycle belong to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn from_string(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity the transport attaches to every connected client.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub connection_id: ConnectionId,
    pub client_address: String,
    pub username: String,
}

// Control subjects are bit-exact request names; SDKs publish on these.
pub const SUBJECT_CREATE_PRODUCER: &str = "create_producer";
pub const SUBJECT_DESTROY_PRODUCER: &str = "destroy_producer";
pub const SUBJECT_CREATE_CONSUMER: &str = "create_consumer";
pub const SUBJECT_DESTROY_CONSUMER: &str = "destroy_consumer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProducerRequest {
    pub name: String,
    pub station_name: String,
    pub connection_id: ConnectionId,
    pub producer_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestroyProducerRequest {
    pub name: String,
    pub station_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConsumerRequest {
    pub name: String,
    pub station_name: String,
    pub connection_id: ConnectionId,
    pub consumer_type: String,
    pub consumers_group: String,
    pub max_ack_time_ms: i64,
    pub max_msg_deliveries: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestroyConsumerRequest {
    pub name: String,
    pub station_name: String,
}

/// Status record returned for every control request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlReply {
    pub success: bool,
    pub error: Option<String>,
}

impl ControlReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Seam between the transport and the control plane.
///
/// Lifecycle signals and control requests are the only paths through which
/// the transport drives core state transitions.
#[async_trait::async_trait]
pub trait ControlPlane: Send + Sync {
    async fn client_registered(&self, client: &ClientInfo);
    async fn client_disconnected(&self, connection_id: &ConnectionId);
    async fn create_producer(
        &self,
        request: CreateProducerRequest,
        client: &ClientInfo,
    ) -> anyhow::Result<()>;
    async fn destroy_producer(
        &self,
        request: DestroyProducerRequest,
        client: &ClientInfo,
    ) -> anyhow::Result<()>;
    async fn create_consumer(
        &self,
        request: CreateConsumerRequest,
        client: &ClientInfo,
    ) -> anyhow::Result<()>;
    async fn destroy_consumer(
        &self,
        request: DestroyConsumerRequest,
        client: &ClientInfo,
    ) -> anyhow::Result<()>;
}

/// Per-station message statistics kept by the data plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamStats {
    pub messages: u64,
    pub bytes: u64,
}

impl StreamStats {
    pub fn average_message_size(&self) -> u64 {
        if self.messages == 0 {
            0
        } else {
            self.bytes / self.messages
        }
    }
}

/// In-process transport: live connection registry, control dispatch, and
/// broadcast rooms.
///
/// ```
/// use bytes::Bytes;
/// use conveyor_transport::Transport;
///
/// let transport = Transport::new();
/// let rt = tokio::runtime::Runtime::new().expect("rt");
/// rt.block_on(async {
///     let mut sub = transport.join_room("main_overview").await;
///     transport
///         .broadcast_to_room("main_overview", Bytes::from_static(b"{}"))
///         .await;
///     assert_eq!(sub.recv().await.expect("recv"), Bytes::from_static(b"{}"));
/// });
/// ```
#[derive(Debug)]
pub struct Transport {
    // Live client registry keyed by connection id.
    clients: RwLock<HashMap<ConnectionId, ClientInfo>>,
    // Overview rooms: scope -> fan-out channel. Membership is the number of
    // live receivers on the sender.
    rooms: RwLock<HashMap<String, broadcast::Sender<Bytes>>>,
    // Data-plane counters per station name.
    streams: RwLock<HashMap<String, StreamStats>>,
    room_capacity: usize,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
            streams: RwLock::new(HashMap::new()),
            room_capacity: DEFAULT_ROOM_CAPACITY,
        }
    }

    /// Register a client socket and notify the control plane.
    ///
    /// A client reconnecting with a previously issued connection id keeps
    /// that identity; the control plane uses the signal to relive the
    /// handles tracked under it.
    pub async fn connect_client(
        &self,
        handler: &dyn ControlPlane,
        connection_id: Option<ConnectionId>,
        client_address: impl Into<String>,
        username: impl Into<String>,
    ) -> ClientInfo {
        let client = ClientInfo {
            connection_id: connection_id.unwrap_or_else(ConnectionId::generate),
            client_address: client_address.into(),
            username: username.into(),
        };
        self.clients
            .write()
            .await
            .insert(client.connection_id.clone(), client.clone());
        handler.client_registered(&client).await;
        client
    }

    /// Drop a client socket and notify the control plane.
    pub async fn disconnect_client(&self, handler: &dyn ControlPlane, connection_id: &ConnectionId) {
        if self.clients.write().await.remove(connection_id).is_some() {
            handler.client_disconnected(connection_id).await;
        }
    }

    pub async fn is_connection_live(&self, connection_id: &ConnectionId) -> bool {
        self.clients.read().await.contains_key(connection_id)
    }

    pub async fn live_connection_ids(&self) -> HashSet<ConnectionId> {
        self.clients.read().await.keys().cloned().collect()
    }

    pub async fn client_info(&self, connection_id: &ConnectionId) -> Option<ClientInfo> {
        self.clients.read().await.get(connection_id).cloned()
    }

    /// Deliver one control request to the handler and build the reply record.
    ///
    /// Malformed payloads and handler rejections both come back as error
    /// replies; the transport never panics on client input.
    pub async fn dispatch(
        &self,
        handler: &dyn ControlPlane,
        subject: &str,
        payload: Bytes,
        sender: &ConnectionId,
    ) -> ControlReply {
        match self.dispatch_inner(handler, subject, payload, sender).await {
            Ok(()) => ControlReply::ok(),
            Err(err) => {
                tracing::warn!(subject, error = %err, "control request rejected");
                ControlReply::err(err.to_string())
            }
        }
    }

    async fn dispatch_inner(
        &self,
        handler: &dyn ControlPlane,
        subject: &str,
        payload: Bytes,
        sender: &ConnectionId,
    ) -> anyhow::Result<()> {
        let client = self
            .client_info(sender)
            .await
            .ok_or_else(|| TransportError::UnknownConnection(sender.clone()))?;
        match subject {
            SUBJECT_CREATE_PRODUCER => {
                let request: CreateProducerRequest =
                    serde_json::from_slice(&payload).map_err(TransportError::BadPayload)?;
                handler.create_producer(request, &client).await
            }
            SUBJECT_DESTROY_PRODUCER => {
                let request: DestroyProducerRequest =
                    serde_json::from_slice(&payload).map_err(TransportError::BadPayload)?;
                handler.destroy_producer(request, &client).await
            }
            SUBJECT_CREATE_CONSUMER => {
                let request: CreateConsumerRequest =
                    serde_json::from_slice(&payload).map_err(TransportError::BadPayload)?;
                handler.create_consumer(request, &client).await
            }
            SUBJECT_DESTROY_CONSUMER => {
                let request: DestroyConsumerRequest =
                    serde_json::from_slice(&payload).map_err(TransportError::BadPayload)?;
                handler.destroy_consumer(request, &client).await
            }
            other => Err(TransportError::UnknownSubject(other.to_string()).into()),
        }
    }

    /// Subscribe to an overview room, creating it on first join.
    pub async fn join_room(&self, scope: &str) -> broadcast::Receiver<Bytes> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(scope.to_string())
            .or_insert_with(|| broadcast::channel(self.room_capacity).0)
            .subscribe()
    }

    /// Fan a frame out to a room; lagging receivers may drop.
    pub async fn broadcast_to_room(&self, scope: &str, frame: Bytes) -> usize {
        let rooms = self.rooms.read().await;
        match rooms.get(scope) {
            Some(sender) => sender.send(frame).unwrap_or(0),
            None => 0,
        }
    }

    pub async fn room_len(&self, scope: &str) -> usize {
        self.rooms
            .read()
            .await
            .get(scope)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Scopes with at least one live member. Empty rooms are pruned here so
    /// the registry does not accumulate dead scopes between ticks.
    pub async fn populated_rooms(&self) -> Vec<String> {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, sender| sender.receiver_count() > 0);
        rooms.keys().cloned().collect()
    }

    /// Data-plane hook: account one published message against a station.
    pub async fn record_publish(&self, station_name: &str, payload_len: usize) {
        let mut streams = self.streams.write().await;
        let stats = streams.entry(station_name.to_string()).or_default();
        stats.messages += 1;
        stats.bytes += payload_len as u64;
    }

    pub async fn stream_stats(&self, station_name: &str) -> StreamStats {
        self.streams
            .read()
            .await
            .get(station_name)
            .copied()
            .unwrap_or_default()
    }
}
