//! Conversion between file byte order and host byte order

/// Integers that can be byte-swapped between file and host order
pub trait FileEndian: Copy {
    fn swap_bytes(self) -> Self;
}

macro_rules! impl_file_endian {
    ($($ty:ty),*) => {
        $(
            impl FileEndian for $ty {
                #[inline]
                fn swap_bytes(self) -> Self {
                    <$ty>::swap_bytes(self)
                }
            }
        )*
    };
}

impl_file_endian!(u8, u16, u32, u64);

const HOST_IS_LITTLE_ENDIAN: bool = cfg!(target_endian = "little");

/// Convert a value loaded in host order from a file of the given byte order
#[inline]
pub fn from_file_endian<T: FileEndian>(value: T, file_is_little_endian: bool) -> T {
    if file_is_little_endian == HOST_IS_LITTLE_ENDIAN {
        value
    } else {
        value.swap_bytes()
    }
}

/// Convert a host value to the byte order of the file
#[inline]
pub fn to_file_endian<T: FileEndian>(value: T, file_is_little_endian: bool) -> T {
    from_file_endian(value, file_is_little_endian)
}
