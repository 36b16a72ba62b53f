#[cfg(any(test, feature = "memory-store"))]
pub(crate) mod memory;
pub(crate) mod postgres;
