pub mod ctc_decoder;
pub mod detector_pool;
pub mod execution_provider;
pub mod model_loader;
pub mod onnx_blazeface_detector;
pub mod onnx_text_reader;
pub mod text_box_extractor;
