pub mod face_detector;
pub mod region_detector;
pub mod sensitive_text;
pub mod text_fragment;
pub mod text_reader;
