pub mod error;
pub mod labels;
pub mod preprocess;
pub mod selector;

#[cfg(feature = "ml")]
pub mod engine;
#[cfg(feature = "ml")]
pub mod handle;
#[cfg(feature = "ml")]
pub mod net;

pub use error::ClassifierError;
pub use labels::LabelSet;
pub use preprocess::{preprocess_image, IMAGE_MEAN, IMAGE_STD, PIXEL_CHANNELS};
pub use selector::select_top_label;

#[cfg(feature = "ml")]
pub use engine::{InferenceBackend, InferenceEngine};
#[cfg(feature = "ml")]
pub use handle::{Classification, Classifier};
#[cfg(feature = "ml")]
pub use net::{LeafNet, NetConfig};
