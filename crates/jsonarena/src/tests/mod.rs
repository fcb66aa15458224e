mod msgpack;
mod property_roundtrip;
