mod pxd;
mod template;

pub use pxd::{format_pxd, PxdSettings};
pub use template::{render_template, types_header_list, wrap_header_list, HEADER_LIST_PLACEHOLDER};
