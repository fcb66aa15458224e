//! Arena-backed JSON and MessagePack documents.
//!
//! A [`Document`] owns one root value and an [`Arena`] holding everything
//! else: collection slots and owned string bytes. The arena's backing
//! buffers grow geometrically and never reserve more heap than its
//! capacity, so a fixed arena puts a hard bound on the memory a document
//! can use.
//!
//! ```rust
//! use jsonarena::{Document, json::{self, JsonWriterOptions}, msgpack};
//!
//! let input = r#"{"sensor":"gps","time":1351824120,"data":[48.75608,2.302038]}"#;
//! let mut doc = Document::with_capacity(1024);
//! json::from_str(&mut doc, input).unwrap();
//!
//! let root = doc.root();
//! assert_eq!(root.get("sensor").as_str(), Some("gps"));
//! assert_eq!(root.get("time").coerce::<u32>(), 1_351_824_120);
//! assert_eq!(root.get("data").len(), 2);
//!
//! // Strings without escapes are linked to `input`, not copied.
//! assert_eq!(doc.memory_usage(), 5 * jsonarena::SLOT_SIZE);
//!
//! let text = json::to_string(root, JsonWriterOptions::default()).unwrap();
//! assert_eq!(text, input);
//!
//! let bytes = msgpack::to_vec(root, Default::default()).unwrap();
//! let mut copy = Document::with_capacity(1024);
//! msgpack::from_slice(&mut copy, &bytes).unwrap();
//! assert_eq!(copy.root(), doc.root());
//! ```
//!
//! # Features
//!
//! - `std`: `IoReader` and `IoWriter` over `std::io`.
//! - `serde`: `serde::Serialize` for [`VariantRef`].

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod arena;
mod document;
mod error;
mod io;
mod number;
mod options;
mod variant;

pub mod json;
pub mod msgpack;

#[cfg(any(test, feature = "serde"))]
mod serde_impl;

#[cfg(test)]
mod tests;

pub use arena::{Arena, ArenaConfig, Growth, SLOT_SIZE};
pub use document::Document;
pub use error::{DeserializeError, DeserializeErrorKind, NoMemory, SerializeError};
pub use io::{CopyingReader, Counter, IterReader, Reader, Sink, SliceReader, SliceWriter};
#[cfg(feature = "std")]
pub use io::{IoReader, IoWriter};
pub use options::DeserializeOptions;
pub use variant::{Index, Iter, Kind, VariantMut, VariantRef, VariantType};
