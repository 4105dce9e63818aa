pub mod domain;
pub mod trader;

pub use domain::classify_domain;
pub use trader::{classify_trader, TraderThresholds};
