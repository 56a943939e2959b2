mod manager;
mod metadata;

pub use manager::{CheckpointManager, CheckpointManagerConfig};
pub use metadata::{
    CheckpointHyperparameters, CheckpointLosses, CheckpointMetadata, CheckpointTag,
};
