//! Network layer: the connection seam and the lifecycle controller.

mod connection;
mod controller;

pub use connection::{Connection, Connector, TcpConnector};
pub use controller::Controller;
