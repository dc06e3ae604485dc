pub mod domain;
pub mod service;

pub use crate::domain::*;
pub use crate::service::*;

pub mod prelude {
    pub use crate::domain::*;
    pub use crate::service::*;
}
