use alloc::{borrow::Cow, boxed::Box, string::String, vec::Vec};
use bytes::Bytes;
use bytestr::ByteStr;

use super::Enumerator;

macro_rules! from_bytes {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Enumerator {
                fn from(data: $ty) -> Self {
                    Enumerator::from_bytes(data)
                }
            }
        )*
    };
}

from_bytes!(Bytes, Vec<u8>, Box<[u8]>, String, &'static [u8], &'static str);

impl From<ByteStr> for Enumerator {
    fn from(text: ByteStr) -> Self {
        Enumerator::from_bytes(Bytes::from(text))
    }
}

impl From<Box<str>> for Enumerator {
    fn from(text: Box<str>) -> Self {
        Enumerator::from_bytes(String::from(text))
    }
}

impl From<Cow<'static, str>> for Enumerator {
    fn from(text: Cow<'static, str>) -> Self {
        match text {
            Cow::Borrowed(text) => Enumerator::from(text),
            Cow::Owned(text) => Enumerator::from(text),
        }
    }
}

impl From<Cow<'static, [u8]>> for Enumerator {
    fn from(data: Cow<'static, [u8]>) -> Self {
        match data {
            Cow::Borrowed(data) => Enumerator::from(data),
            Cow::Owned(data) => Enumerator::from(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::Step;

    async fn collect(body: Enumerator) -> Vec<u8> {
        body.run(
            |mut acc: Vec<u8>, chunk| {
                acc.extend_from_slice(&chunk);
                Step::Continue(acc)
            },
            Vec::new(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn conversions_keep_bytes() {
        assert_eq!(collect(Enumerator::from("static text")).await, b"static text");
        assert_eq!(
            collect(Enumerator::from(String::from("owned"))).await,
            b"owned"
        );
        assert_eq!(collect(Enumerator::from(alloc::vec![1u8, 2, 3])).await, [1, 2, 3]);
        assert_eq!(
            collect(Enumerator::from(Cow::<'static, str>::Owned(String::from("cow")))).await,
            b"cow"
        );
        assert_eq!(
            collect(Enumerator::from(ByteStr::from_static("bytestr"))).await,
            b"bytestr"
        );
    }
}
