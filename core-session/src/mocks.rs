//! mockall doubles of the session bridges shared by unit tests.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    NowPlaying, PlayFromUriExtras, SessionConnector, SessionTransport, StatusChangeStream,
    TransportStatus,
};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Transport {}

    #[async_trait]
    impl SessionTransport for Transport {
        async fn play(&self) -> BridgeResult<()>;
        async fn pause(&self) -> BridgeResult<()>;
        async fn seek(&self, position_ms: u64) -> BridgeResult<()>;
        async fn play_from_uri(&self, uri: String, extras: PlayFromUriExtras) -> BridgeResult<()>;
        async fn stop(&self) -> BridgeResult<()>;
        async fn status(&self) -> BridgeResult<TransportStatus>;
        async fn current_track(&self) -> BridgeResult<Option<NowPlaying>>;
        async fn subscribe_status(&self) -> BridgeResult<Box<dyn StatusChangeStream>>;
    }
}

mock! {
    pub Connector {}

    #[async_trait]
    impl SessionConnector for Connector {
        async fn connect(&self) -> BridgeResult<Arc<dyn SessionTransport>>;
        async fn disconnect(&self) -> BridgeResult<()>;
    }
}
