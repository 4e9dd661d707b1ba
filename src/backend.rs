use burn::backend::Autodiff;

#[cfg(not(feature = "tch"))]
use burn::backend::{ndarray::NdArrayDevice, NdArray};

#[cfg(feature = "tch")]
use burn::backend::{libtorch::LibTorchDevice, LibTorch};

/// The training backend used by the command line tools
#[cfg(not(feature = "tch"))]
pub type Backend = Autodiff<NdArray>;

/// The training backend used by the command line tools
#[cfg(feature = "tch")]
pub type Backend = Autodiff<LibTorch>;

/// The device computation runs on
#[cfg(not(feature = "tch"))]
pub fn device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}

/// The device computation runs on
#[cfg(feature = "tch")]
pub fn device() -> LibTorchDevice {
    LibTorchDevice::Cuda(0)
}
