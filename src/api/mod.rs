pub mod http_client;
pub mod kraken;

pub use http_client::{
    ReqwestTransport, ResilientClient, Transport, TransportError, UpstreamResponse,
};
pub use kraken::KrakenClient;
