pub mod energy;
pub mod plant;

pub use energy::*;
pub use plant::*;
