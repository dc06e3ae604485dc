pub mod dispatch;
pub mod error;
pub mod event;
pub mod relay_result;

pub use dispatch::*;
pub use error::*;
pub use event::*;
pub use relay_result::*;
