pub mod compose;
pub mod pipeline;
pub mod plan;
