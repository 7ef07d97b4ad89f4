mod check;
mod extract;
mod generate;
pub mod pipeline;

pub use check::*;
pub use extract::*;
pub use generate::*;
