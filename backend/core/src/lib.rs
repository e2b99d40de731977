pub mod error;
pub mod traits;
pub mod types;

pub use error::BibError;
pub use traits::Detector;
pub use types::{
    extension_of, BackendKind, DetectionResult, DetectorOutput, NumberSet, RenamePlan,
    SourceImage, IMAGE_EXTENSIONS,
};
