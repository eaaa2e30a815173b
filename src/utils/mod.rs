pub mod bulk;
pub mod datetime;
pub mod feedback;
pub mod logging;
pub mod pagination;
pub mod text;
pub mod validation;
