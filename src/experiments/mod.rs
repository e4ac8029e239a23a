pub mod drift;
pub mod softmax;
