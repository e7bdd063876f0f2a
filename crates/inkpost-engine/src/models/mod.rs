pub mod format;
pub mod media;
pub mod table;

pub use format::*;
pub use media::MediaReference;
pub use table::*;
