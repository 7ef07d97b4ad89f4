mod decl;
mod diagnostic;

pub use decl::*;
pub use diagnostic::*;
