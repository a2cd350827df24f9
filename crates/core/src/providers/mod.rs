pub mod traits;
pub mod wire;

// API source implementations
pub mod http;
