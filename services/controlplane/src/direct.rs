//! Direct (transport in-band) control surface.
//!
//! The transport delivers typed control requests and lifecycle signals here;
//! replies carry either success or the user-visible error message. Server
//! faults are logged at error level and surfaced as their generic display
//! text only, never driver detail.
use crate::core::Core;
use crate::error::OpsError;
use crate::handlers::{connections, consumers, producers};
use conveyor_transport::{
    ClientInfo, ConnectionId, ControlPlane, CreateConsumerRequest, CreateProducerRequest,
    DestroyConsumerRequest, DestroyProducerRequest,
};

fn into_reply_error(operation: &'static str, err: OpsError) -> anyhow::Error {
    if err.is_client_error() {
        tracing::warn!(operation, error = %err, "control request rejected");
    } else {
        tracing::error!(operation, error = ?err, "control request failed");
    }
    anyhow::anyhow!(err.to_string())
}

#[async_trait::async_trait]
impl ControlPlane for Core {
    async fn client_registered(&self, client: &ClientInfo) {
        if let Err(err) = connections::client_registered(self, client).await {
            tracing::error!(
                connection_id = %client.connection_id,
                error = ?err,
                "failed to register client connection"
            );
        }
    }

    async fn client_disconnected(&self, connection_id: &ConnectionId) {
        if let Err(err) = connections::client_disconnected(self, connection_id).await {
            tracing::error!(
                %connection_id,
                error = ?err,
                "failed to handle client disconnect"
            );
        }
    }

    async fn create_producer(
        &self,
        request: CreateProducerRequest,
        client: &ClientInfo,
    ) -> anyhow::Result<()> {
        producers::create_producer_direct(self, &request, client)
            .await
            .map_err(|err| into_reply_error("create_producer", err))
    }

    async fn destroy_producer(
        &self,
        request: DestroyProducerRequest,
        client: &ClientInfo,
    ) -> anyhow::Result<()> {
        producers::destroy_producer_direct(self, &request, client)
            .await
            .map_err(|err| into_reply_error("destroy_producer", err))
    }

    async fn create_consumer(
        &self,
        request: CreateConsumerRequest,
        client: &ClientInfo,
    ) -> anyhow::Result<()> {
        consumers::create_consumer_direct(self, &request, client)
            .await
            .map_err(|err| into_reply_error("create_consumer", err))
    }

    async fn destroy_consumer(
        &self,
        request: DestroyConsumerRequest,
        client: &ClientInfo,
    ) -> anyhow::Result<()> {
        consumers::destroy_consumer_direct(self, &request, client)
            .await
            .map_err(|err| into_reply_error("destroy_consumer", err))
    }
}
