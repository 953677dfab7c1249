//! Per-block encoders for the module's sub-blocks.

mod constants;
mod function;
mod metadata;
mod metadata_attachment;
mod metadata_kind;
mod param_attr;
mod types;

pub use constants::ConstantBlock;
pub use function::FunctionBlock;
pub use metadata::MetadataBlock;
pub use metadata_kind::MetadataKindBlock;
pub use param_attr::ParamAttrBlock;
pub use types::TypeBlock;
