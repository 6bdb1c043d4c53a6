pub mod network;
pub mod state;
pub mod topology;

pub use network::{Network, NetworkOptions};
pub use state::{LayerState, NetworkState};
pub use topology::Topology;
