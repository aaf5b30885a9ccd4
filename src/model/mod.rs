pub mod config;
pub mod model_metadata;
pub mod model_storage;

pub use config::{AppConfig, ModelSettings};
pub use model_metadata::ModelMetadata;
pub use model_storage::{
    load_metadata, load_model_with_metadata, print_metadata_info, save_model_with_metadata,
};
