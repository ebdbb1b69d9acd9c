pub mod encoder;
pub mod lexical;
pub mod record;

pub use encoder::{encode, FeaturedBody, NBBINS, PAGE_MARKER};
pub use record::FeatureRecord;
