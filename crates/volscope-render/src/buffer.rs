//! GPU buffer helpers.

use wgpu::util::DeviceExt;

/// Creates a uniform buffer holding one value.
pub fn create_uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &T,
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::bytes_of(data),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Vertex buffer rewritten every frame, reallocated only when it must grow.
pub struct StreamBuffer {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    len: u64,
}

impl StreamBuffer {
    /// Creates an empty stream buffer. Nothing is allocated until the first write.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            buffer: None,
            len: 0,
        }
    }

    /// Uploads `data`, growing the buffer to the next power of two if needed.
    pub fn write<T: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[T],
    ) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.len = bytes.len() as u64;
        if bytes.is_empty() {
            return;
        }

        let needed = self.len.next_power_of_two();
        if self.buffer.as_ref().map_or(true, |b| b.size() < needed) {
            log::debug!("{}: growing to {} bytes", self.label, needed);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: needed,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }
        if let Some(buffer) = &self.buffer {
            queue.write_buffer(buffer, 0, bytes);
        }
    }

    /// Slice covering the data of the last write, if any.
    pub fn slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        match &self.buffer {
            Some(buffer) if self.len > 0 => Some(buffer.slice(..self.len)),
            _ => None,
        }
    }
}
