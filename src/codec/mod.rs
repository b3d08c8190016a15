//! Codec module - serialization/deserialization for reply documents.
//!
//! - [`BsonCodec`] - BSON using the `bson` crate's serde integration
//!
//! # Design
//!
//! Codecs are implemented as marker structs with static methods rather than trait objects.
//! Reply shapes are plain serde types, so unknown fields can be captured with
//! `#[serde(flatten)]` and written back on encode.
//!
//! # Example
//!
//! ```
//! use replset_proxy::codec::BsonCodec;
//! use bson::doc;
//!
//! let encoded = BsonCodec::encode(&doc! { "ismaster": true }).unwrap();
//! let decoded: bson::Document = BsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded.get_bool("ismaster").unwrap(), true);
//! ```

mod document;

pub use document::BsonCodec;
