pub mod candle;
pub mod signals;

pub use candle::*;
pub use signals::*;
