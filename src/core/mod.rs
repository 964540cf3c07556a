pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{CorrectionResult, ExtractBundle};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::{IbError, Result};
pub use engine::IbEngine;
pub use pipeline::Atl06Pipeline;
