pub mod binance;

pub use binance::{BinanceClient, CandleSource, BINANCE_API_URL};
