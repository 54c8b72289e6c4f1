pub mod observation;
pub mod slot;

pub use observation::*;
pub use slot::*;
