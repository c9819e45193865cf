mod cach;
mod framer;
mod message;
mod stream;

pub use cach::Cach;
pub use framer::{BurstFramer, PhaseLockedLoop};
pub use message::{Burst, BurstListener, FramedBurst, FramerEvent, SyncLoss};
pub use stream::MessageFramer;
