pub mod name;
pub mod reader;
pub mod writer;

pub use name::GranuleInfo;
