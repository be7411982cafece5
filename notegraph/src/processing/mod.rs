mod assembler;
mod builder;
mod frontmatter;
mod pipeline;
mod relations;
mod temporal;

pub use assembler::{normalize_org, BuildStats, GraphAssembler};
pub use builder::EntityBuilder;
pub use frontmatter::{split_header, Header, SplitDocument};
pub use pipeline::BuildPipeline;
pub use relations::{RelationExtractor, Relations};
pub use temporal::TemporalExtractor;
