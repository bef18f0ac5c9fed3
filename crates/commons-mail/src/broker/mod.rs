//! Job broker implementations.

pub mod memory;
pub mod redis;

pub use self::memory::MemoryBroker;
pub use self::redis::RedisBroker;
