pub mod handle;
pub mod registry;

pub use handle::NetworkHandle;
pub use registry::Engine;
