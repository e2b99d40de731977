pub mod mock;
pub mod ocr;
pub mod ollama;
pub mod openai;
pub mod registry;

pub use mock::MockDetector;
pub use ocr::OcrDetector;
pub use ollama::OllamaDetector;
pub use openai::OpenAiDetector;
pub use registry::DetectorRegistry;
