#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use sigmablur_image as image;

#[doc(inline)]
pub use sigmablur_imgproc as imgproc;
