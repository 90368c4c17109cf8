//! 도메인 타입.

pub mod request;
pub mod stock;
pub mod time_frame;
