pub mod connector;
pub mod push_channel;
pub mod reconnect;

pub use connector::{PushConnector, PushStream, WsConnector};
pub use push_channel::{parse_frame, PushChannel, PushEvent, SubscriberId, Subscription};
pub use reconnect::{ConnectionState, ReconnectMachine, ReconnectPolicy};
