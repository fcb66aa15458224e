//! `serde::Serialize` for variants, so any serde serializer can walk a
//! document.
//!
//! Raw fragments are handed over as bytes; serializers for text formats
//! usually render them as a sequence of integers.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::variant::{VariantRef, data::Data};

impl Serialize for VariantRef<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(data) = self.data() else {
            return serializer.serialize_unit();
        };
        match *data {
            Data::Null => serializer.serialize_unit(),
            Data::Bool(b) => serializer.serialize_bool(b),
            Data::UInt(n) => serializer.serialize_u64(n),
            Data::Int(n) => serializer.serialize_i64(n),
            Data::Float(f) => serializer.serialize_f64(f),
            Data::Str(_) => serializer.serialize_str(self.as_str().unwrap_or_default()),
            Data::Raw(_) => serializer.serialize_bytes(self.as_raw().unwrap_or_default()),
            Data::Array(_) => {
                let mut seq = serializer.serialize_seq(Some(self.len()))?;
                for (_, item) in self.iter() {
                    seq.serialize_element(&item)?;
                }
                seq.end()
            }
            Data::Object(_) => {
                let mut map = serializer.serialize_map(Some(self.len()))?;
                for (key, item) in self.iter() {
                    map.serialize_entry(key.unwrap_or_default(), &item)?;
                }
                map.end()
            }
        }
    }
}
