use alloc::string::String;

use super::{VariantMut, VariantRef};

/// A position in an array or a key in an object, accepted by
/// [`VariantRef::get`], [`VariantMut::get_mut`] and
/// [`VariantMut::get_or_create`].
///
/// Implemented for `usize` and for string types; sealed.
pub trait Index: private::Sealed {
    #[doc(hidden)]
    fn index_into<'a, 'src>(&self, variant: VariantRef<'a, 'src>) -> VariantRef<'a, 'src>;

    #[doc(hidden)]
    fn index_into_mut<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src>;

    #[doc(hidden)]
    fn index_or_insert<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src>;
}

impl Index for usize {
    fn index_into<'a, 'src>(&self, variant: VariantRef<'a, 'src>) -> VariantRef<'a, 'src> {
        variant.element(*self)
    }

    fn index_into_mut<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src> {
        variant.element_mut(*self)
    }

    fn index_or_insert<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src> {
        variant.element_or_insert(*self)
    }
}

impl Index for str {
    fn index_into<'a, 'src>(&self, variant: VariantRef<'a, 'src>) -> VariantRef<'a, 'src> {
        variant.member(self)
    }

    fn index_into_mut<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src> {
        variant.member_mut(self)
    }

    fn index_or_insert<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src> {
        variant.member_or_insert(self)
    }
}

impl Index for String {
    fn index_into<'a, 'src>(&self, variant: VariantRef<'a, 'src>) -> VariantRef<'a, 'src> {
        self.as_str().index_into(variant)
    }

    fn index_into_mut<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src> {
        self.as_str().index_into_mut(variant)
    }

    fn index_or_insert<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src> {
        self.as_str().index_or_insert(variant)
    }
}

impl<T: Index + ?Sized> Index for &T {
    fn index_into<'a, 'src>(&self, variant: VariantRef<'a, 'src>) -> VariantRef<'a, 'src> {
        (**self).index_into(variant)
    }

    fn index_into_mut<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src> {
        (**self).index_into_mut(variant)
    }

    fn index_or_insert<'a, 'src>(&self, variant: VariantMut<'a, 'src>) -> VariantMut<'a, 'src> {
        (**self).index_or_insert(variant)
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for str {}
    impl Sealed for alloc::string::String {}
    impl<T: Sealed + ?Sized> Sealed for &T {}
}
