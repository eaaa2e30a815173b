pub mod admin;
pub mod episode;
pub mod logs;
pub mod title;

pub use admin::*;
pub use episode::*;
pub use logs::*;
pub use title::*;
