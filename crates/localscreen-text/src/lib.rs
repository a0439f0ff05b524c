//! localscreen-text
//!
//! Input normalization: encoding repair, URL/mention masking, hashtag
//! segmentation, emoji naming, case folding and whitespace collapse.

pub mod emoji;
pub mod normalize;
pub mod repair;
pub mod segment;

pub use normalize::{Normalizer, URL_TOKEN, USER_TOKEN};
pub use segment::WordSegmenter;
