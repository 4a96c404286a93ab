pub mod mock;
pub mod onnx;
pub mod persistence;
