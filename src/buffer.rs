use wgpu::util::DeviceExt;

/// Conversion into the `#[repr(C)]` form that gets copied to the GPU.
pub trait ToRaw {
    type Raw: bytemuck::Pod;

    fn to_raw(&self) -> Self::Raw;
}

#[derive(Debug)]
pub struct UniformBuffer<U: bytemuck::Pod> {
    value: U,
    buffer: wgpu::Buffer,
}

impl<U: bytemuck::Pod> UniformBuffer<U> {
    pub fn new(value: U, device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: None,
            contents: bytemuck::cast_slice(&[value]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self { value, buffer }
    }

    pub fn update_and_prepare(&mut self, value: U, queue: &wgpu::Queue) {
        self.value = value;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.value]));
    }

    pub fn value(&self) -> &U {
        &self.value
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Fixed-capacity instance storage. Allocated once, refilled in place every
/// frame; `prepare` uploads only the live prefix and remembers how many
/// instances to draw. Writing more instances than the buffer has capacity for
/// is a programming error and panics.
#[derive(Debug)]
pub struct InstanceBuffer<V: bytemuck::Pod> {
    buffer: wgpu::Buffer,
    capacity: usize,
    n_instances: usize,
    _phantom: std::marker::PhantomData<V>,
}

impl<V: bytemuck::Pod> InstanceBuffer<V> {
    pub fn new(capacity: usize, device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: (capacity * std::mem::size_of::<V>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            capacity,
            n_instances: 0,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Uploads `instances` into the first slots of the buffer and marks them
    /// as the live draw range. Slots past `instances.len()` are neither
    /// uploaded nor drawn.
    pub fn prepare(&mut self, instances: &[V], queue: &wgpu::Queue) {
        assert!(
            instances.len() <= self.capacity,
            "instance buffer overrun: {} instances, capacity {}",
            instances.len(),
            self.capacity
        );
        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        }
        self.n_instances = instances.len();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn n_instances(&self) -> usize {
        self.n_instances
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}
