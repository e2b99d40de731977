//! Turning detections into renamed copies.
//!
//! `naming` derives the destination file name, `pipeline` handles one image
//! end to end, `batch` walks a source folder, and `report` compares runs.

pub mod batch;
pub mod naming;
pub mod pipeline;
pub mod report;

pub use batch::{list_images, BatchReport, BatchRunner};
pub use naming::{derive_file_name, plan_rename};
pub use pipeline::{process_image, ImageOutcome, SkipReason};
pub use report::{improvement_pct, Comparison, RunTiming};
