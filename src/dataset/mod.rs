mod load;
mod record;

pub use load::Dataset;
pub use record::{Modification, Record};
