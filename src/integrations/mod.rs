//! External service integrations.

pub mod services {
    pub use crate::services::*;
}

pub mod cache {
    pub use crate::cache::*;
}
