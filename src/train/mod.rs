pub mod loop_fn;
pub mod report;
pub mod train_config;
pub mod training_set;

pub use loop_fn::train_loop;
pub use report::{StopReason, TrainReport};
pub use train_config::TrainConfig;
pub use training_set::TrainingSet;
