//! Model files and fixed operating parameters.
//!
//! The `*_URL` constants name where the models will be published; nothing is
//! hosted there yet, so deployments must pass `--model-dir` pointing at a
//! directory holding the four files below.

pub const FACE_MODEL_NAME: &str = "blazeface_short_range.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/lostfound-redact/models/releases/download/v0.1.0/blazeface_short_range.onnx";

pub const TEXT_DETECTION_MODEL_NAME: &str = "en_ppocr_det.onnx";
pub const TEXT_DETECTION_MODEL_URL: &str =
    "https://github.com/lostfound-redact/models/releases/download/v0.1.0/en_ppocr_det.onnx";

pub const TEXT_RECOGNITION_MODEL_NAME: &str = "en_ppocr_rec.onnx";
pub const TEXT_RECOGNITION_MODEL_URL: &str =
    "https://github.com/lostfound-redact/models/releases/download/v0.1.0/en_ppocr_rec.onnx";

pub const TEXT_DICTIONARY_NAME: &str = "en_dict.txt";
pub const TEXT_DICTIONARY_URL: &str =
    "https://github.com/lostfound-redact/models/releases/download/v0.1.0/en_dict.txt";

/// Fixed operating point of the face sub-detector.
pub const FACE_CONFIDENCE: f64 = 0.5;

/// Pixels added on every side of a region before blurring.
pub const REDACTION_PAD: i32 = 5;

pub const REDACTION_KERNEL_SIZE: usize = 99;
pub const REDACTION_SIGMA: f64 = 30.0;

/// Outline drawn around every redacted rectangle.
pub const REDACTION_OUTLINE_COLOR: [u8; 3] = [0, 0, 0];

/// Case-folded substrings that mark an OCR fragment as an ID label.
pub const SENSITIVE_KEYWORDS: &[&str] = &["aadhaar", "card", "number", "dob", "birth", "signature"];

/// 12-digit national ID, grouped `DDDD DDDD DDDD` or as a single run.
pub const NATIONAL_ID_PATTERN: &str = r"\d{4}\s\d{4}\s\d{4}|\d{12}";

/// Minimum length of an all-digit fragment (spaces removed) treated as an ID.
pub const MIN_NUMERIC_ID_LEN: usize = 10;

pub const CATEGORY_MATCH_SCORE: u32 = 30;
pub const PROXIMITY_SCORE: u32 = 20;

/// Raw lat/lng degrees, roughly 10 km near the equator.
pub const PROXIMITY_THRESHOLD_DEGREES: f64 = 0.1;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
