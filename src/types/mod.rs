pub mod bot;
pub mod log;
pub mod market;
pub mod snapshot;
pub mod trading;

pub use bot::*;
pub use log::*;
pub use market::*;
pub use snapshot::*;
pub use trading::*;
