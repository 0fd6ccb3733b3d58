pub mod builder;
pub mod io;

pub use builder::AnnotationBuilder;
pub use io::{AnnotationReader, AnnotationRecord, ParseError};
