use alloc::string::{String, ToString};

use super::{VariantRef, data::Data};
use crate::number::{self, Number};

/// Types a variant can be tested for and coerced into.
///
/// `is` is exact: it holds only when the stored value is representable as
/// `Self` without conversion. `coerce` never fails and falls back to the
/// type's zero value:
///
/// | target          | conversion                                                   |
/// |-----------------|--------------------------------------------------------------|
/// | `bool`          | `true` for `true`, non-zero numbers and non-empty strings     |
/// | integers        | range-checked; booleans as 0/1; numeric strings are parsed    |
/// | `f32`, `f64`    | any number or numeric string; booleans as 0/1                 |
/// | `&str`          | the string, or `""`                                           |
/// | `String`        | the string, or the text of a number or boolean                |
/// | `&[u8]`         | the bytes of a raw fragment, or empty                         |
///
/// Containers, `null` and unbound handles coerce to the zero value of every
/// target.
pub trait VariantType<'a>: Sized {
    /// Exact type test.
    fn is(variant: &VariantRef<'a, '_>) -> bool;

    /// Lossy conversion.
    fn coerce(variant: &VariantRef<'a, '_>) -> Self;
}

/// The numeric reading of scalars, as used by integer and float coercion.
fn numeric(variant: &VariantRef<'_, '_>) -> Option<Number> {
    match *variant.data()? {
        Data::Bool(b) => Some(Number::UInt(u64::from(b))),
        Data::UInt(n) => Some(Number::UInt(n)),
        Data::Int(n) => Some(Number::Int(n)),
        Data::Float(f) => Some(Number::Float(f)),
        Data::Str(_) => number::parse_text(variant.as_str()?),
        _ => None,
    }
}

macro_rules! integer {
    ($($ty:ty),* $(,)?) => {$(
        impl<'a> VariantType<'a> for $ty {
            fn is(variant: &VariantRef<'a, '_>) -> bool {
                match variant.data() {
                    Some(Data::UInt(n)) => <$ty>::try_from(*n).is_ok(),
                    Some(Data::Int(n)) => <$ty>::try_from(*n).is_ok(),
                    _ => false,
                }
            }

            fn coerce(variant: &VariantRef<'a, '_>) -> Self {
                numeric(variant).and_then(Number::to_integer).unwrap_or(0)
            }
        }
    )*};
}

integer!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl<'a> VariantType<'a> for f64 {
    fn is(variant: &VariantRef<'a, '_>) -> bool {
        matches!(variant.data(), Some(Data::Float(_)))
    }

    fn coerce(variant: &VariantRef<'a, '_>) -> Self {
        numeric(variant).map_or(0.0, Number::to_f64)
    }
}

impl<'a> VariantType<'a> for f32 {
    fn is(variant: &VariantRef<'a, '_>) -> bool {
        matches!(variant.data(), Some(Data::Float(_)))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn coerce(variant: &VariantRef<'a, '_>) -> Self {
        f64::coerce(variant) as f32
    }
}

impl<'a> VariantType<'a> for bool {
    fn is(variant: &VariantRef<'a, '_>) -> bool {
        matches!(variant.data(), Some(Data::Bool(_)))
    }

    fn coerce(variant: &VariantRef<'a, '_>) -> Self {
        match variant.data() {
            Some(Data::Bool(b)) => *b,
            Some(Data::UInt(n)) => *n != 0,
            Some(Data::Int(n)) => *n != 0,
            Some(Data::Float(f)) => *f != 0.0,
            Some(Data::Str(_)) => variant.as_str().is_some_and(|s| !s.is_empty()),
            _ => false,
        }
    }
}

impl<'a> VariantType<'a> for &'a str {
    fn is(variant: &VariantRef<'a, '_>) -> bool {
        variant.as_str().is_some()
    }

    fn coerce(variant: &VariantRef<'a, '_>) -> Self {
        variant.as_str().unwrap_or_default()
    }
}

impl<'a> VariantType<'a> for String {
    fn is(variant: &VariantRef<'a, '_>) -> bool {
        variant.as_str().is_some()
    }

    fn coerce(variant: &VariantRef<'a, '_>) -> Self {
        match variant.data() {
            Some(Data::Str(_)) => variant.as_str().unwrap_or_default().into(),
            Some(Data::Bool(b)) => b.to_string(),
            Some(Data::UInt(n)) => n.to_string(),
            Some(Data::Int(n)) => n.to_string(),
            Some(Data::Float(f)) if f.is_finite() => {
                let mut out = String::new();
                match number::write_float(&mut out, *f, None) {
                    Ok(()) => out,
                    Err(_) => String::new(),
                }
            }
            Some(Data::Float(f)) => f.to_string(),
            _ => String::new(),
        }
    }
}

impl<'a> VariantType<'a> for &'a [u8] {
    fn is(variant: &VariantRef<'a, '_>) -> bool {
        matches!(variant.data(), Some(Data::Raw(_)))
    }

    fn coerce(variant: &VariantRef<'a, '_>) -> Self {
        variant.as_raw().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use alloc::string::String;

    use crate::{Document, json};

    #[test]
    fn integers_are_range_checked() {
        let mut doc = Document::with_capacity(256);
        json::from_str(&mut doc, "[300, -1, 1.9, \"42\", true]").unwrap();
        let root = doc.root();

        assert!(root.get(0).is::<u16>());
        assert!(!root.get(0).is::<u8>());
        assert_eq!(root.get(0).coerce::<u8>(), 0);
        assert_eq!(root.get(1).coerce::<u32>(), 0);
        assert_eq!(root.get(1).coerce::<i8>(), -1);
        assert!(!root.get(2).is::<i32>());
        assert_eq!(root.get(2).coerce::<i32>(), 1);
        assert!(!root.get(3).is::<u8>());
        assert_eq!(root.get(3).coerce::<u8>(), 42);
        assert_eq!(root.get(4).coerce::<u8>(), 1);
    }

    #[test]
    fn floats_and_booleans() {
        let mut doc = Document::with_capacity(256);
        json::from_str(&mut doc, "[0, 2, \"\", \"x\", 0.5, {}]").unwrap();
        let root = doc.root();

        assert!(!root.get(0).coerce::<bool>());
        assert!(root.get(1).coerce::<bool>());
        assert!(!root.get(2).coerce::<bool>());
        assert!(root.get(3).coerce::<bool>());
        assert!(!root.get(5).coerce::<bool>());
        assert!(root.get(4).is::<f64>());
        assert!(!root.get(1).is::<f64>());
        assert_eq!(root.get(1).coerce::<f64>(), 2.0);
        assert_eq!(root.get(4).coerce::<f32>(), 0.5);
    }

    #[test]
    fn strings() {
        let mut doc = Document::with_capacity(256);
        json::from_str(&mut doc, r#"["a", 1.5, -3, false, null]"#).unwrap();
        let root = doc.root();

        assert_eq!(root.get(0).coerce::<&str>(), "a");
        assert_eq!(root.get(1).coerce::<&str>(), "");
        assert_eq!(root.get(1).coerce::<String>(), "1.5");
        assert_eq!(root.get(2).coerce::<String>(), "-3");
        assert_eq!(root.get(3).coerce::<String>(), "false");
        assert_eq!(root.get(4).coerce::<String>(), "");
        assert!(root.get(0).is::<&str>());
        assert!(!root.get(4).is::<String>());
    }

    #[test]
    fn unbound_coerces_to_zero_values() {
        let doc = Document::with_capacity(0);
        let missing = doc.root().get("nothing");
        assert!(missing.is_unbound());
        assert_eq!(missing.coerce::<i64>(), 0);
        assert_eq!(missing.coerce::<f64>(), 0.0);
        assert!(!missing.coerce::<bool>());
        assert_eq!(missing.coerce::<&str>(), "");
        assert_eq!(missing.coerce::<&[u8]>(), b"");
    }
}
