use anyhow::Result;

/// Device and queue for offscreen compute work. No surface is created.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter: wgpu::Adapter,
}

impl GpuContext {
    pub fn new() -> Result<Self> {
        // Storage buffers in compute shaders rule out the GL backend.
        let backends = wgpu::Backends::VULKAN | wgpu::Backends::METAL | wgpu::Backends::DX12;
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| {
            anyhow::anyhow!("No suitable GPU adapter found. Vulkan, Metal, or DX12 is required.")
        })?;

        let info = adapter.get_info();
        log::info!("Using GPU: {} (backend: {:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tiled path tracer device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                ..Default::default()
            },
            None,
        ))?;
        device.on_uncaptured_error(Box::new(|err| log::error!("wgpu error: {err}")));

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }

    /// Largest storage binding the device accepts, in bytes.
    pub fn max_storage_binding(&self) -> u64 {
        u64::from(self.device.limits().max_storage_buffer_binding_size)
    }
}
