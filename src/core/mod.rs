// Domain-layer modules and shared errors/models
pub mod resolver {
    pub use crate::resolver::*;
}

pub mod enrichment {
    pub use crate::enrichment::*;
}

pub mod map_data {
    pub use crate::map_data::*;
}

pub mod kpi {
    pub use crate::kpi::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
