pub mod traits;

// API provider implementations
pub mod naver;
