mod export;
mod print;

pub use export::{photo_filename, PhotoWriter};
pub use print::spool_to_printer;
