pub mod caching;
pub mod cnb;
pub mod util;

pub use caching::RateCache;
pub use cnb::CnbRateSource;
