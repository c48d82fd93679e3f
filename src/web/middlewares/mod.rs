mod visitor;
pub use visitor::{VISITOR_HEADER, extract_visitor_fn};
