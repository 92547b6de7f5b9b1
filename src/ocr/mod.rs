pub mod engine;
pub mod preprocess;
pub mod recognizer;
pub mod region;
pub mod setup;

pub use engine::{RecognitionProfile, TesseractEngine, TextEngine};
pub use preprocess::{correct_rotation, crop_rect, truncate_bright_pixels};
pub use recognizer::{TextRecognizer, sanitize};
pub use region::RegionSynthesizer;
pub use setup::{available_languages, find_tessdata_dir, find_tesseract_executable};
