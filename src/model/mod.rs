pub mod types;
pub mod transcript;
pub mod gene;
pub mod splice;

pub use types::{
    GeneId, SpliceClass, SpliceHit, SpliceOptions, TranscriptId
};
pub use splice::CisWindow;
