pub mod normalize;
pub mod numbers;

pub use normalize::{normalize, stream_fragments, REGION_SEPARATOR};
pub use numbers::{digit_runs, extract_numbers};
