pub mod handle;
pub mod manager;
pub mod pool;
pub mod system_memory;
