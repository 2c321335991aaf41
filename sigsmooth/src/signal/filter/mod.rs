/// Digital IIR filter design
/// Functions located in the [`Filter design` section of
/// `scipy.signal`](https://docs.scipy.org/doc/scipy/reference/signal.html#filter-design).
pub mod design;

mod ext;
mod kernels;
mod lowpass;
mod sosfilt;
mod sosfiltfilt;

pub use ext::*;
pub use kernels::*;
pub use lowpass::*;
pub use sosfilt::*;
pub use sosfiltfilt::*;
