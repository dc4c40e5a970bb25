mod canonical;
mod enrichment;
mod err;
mod sidecar;
mod tz;


pub use canonical::*;
pub use enrichment::*;
pub use err::*;
pub use sidecar::*;
pub use tz::*;
