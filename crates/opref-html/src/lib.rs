pub mod page;
pub mod rows;

pub use page::{render_page, PageOptions};
pub use rows::{sections, Detail, Row, Section};
