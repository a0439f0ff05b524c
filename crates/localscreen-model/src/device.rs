use candle_core::Device;
use tracing::info;

/// Pick the best compiled-in accelerator, falling back to the CPU.
pub fn select_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(dev) = Device::new_cuda(0) { info!(device = "cuda", "selected device"); return dev; }
    }
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) { info!(device = "metal", "selected device"); return dev; }
    }
    info!(device = "cpu", "selected device");
    Device::Cpu
}
