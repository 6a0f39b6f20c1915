pub mod frame;
pub mod pipeline;
pub mod sample;
pub mod stats;
