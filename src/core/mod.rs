pub mod aggregate;
pub mod amount;
pub mod decode;
pub mod etl;
pub mod export;
pub mod identifier;
pub mod preview;
pub mod xlsx;

pub use crate::domain::model::{CustomerSummary, InputRow, InputTable, Report};
pub use crate::domain::ports::{ConfigProvider, OutputFormat, Pipeline, RowOrdering, Storage};
pub use crate::utils::error::Result;
