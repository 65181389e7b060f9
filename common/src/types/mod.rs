pub mod callback;
pub mod sensors;
pub mod snapshot;

pub use callback::Callback;
pub use sensors::*;
pub use snapshot::Snapshot;
