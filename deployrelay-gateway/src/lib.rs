pub mod config;
pub mod forward_event;
pub mod forwarder;
pub mod mock_forwarder;
pub mod relay;
pub mod server;
pub mod signature;
pub mod state;
pub mod trigger_request;
pub mod util;
