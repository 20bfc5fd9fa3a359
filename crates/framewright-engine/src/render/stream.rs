//! Append-only upload buffers that are rewound once per frame.
//!
//! `queue.write_buffer` is staged until the next submit, which runs before the
//! frame's command buffer. Two uploads to the same offset within one frame
//! would therefore both be read as the last one. Each upload here lands behind
//! the previous uploads of the same frame instead.

use std::ops::Range;

use super::RenderCtx;

/// Where an upload goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Slot {
    /// Fits behind this frame's earlier uploads.
    At(u64),
    /// Needs a new buffer of `size` bytes; the upload goes at offset 0.
    Grow { size: u64 },
}

/// Offset bookkeeping for a [`StreamBuffer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct StreamCursor {
    frame: u64,
    offset: u64,
    capacity: u64,
}

impl StreamCursor {
    /// Reserves `len` bytes starting at a multiple of `align`.
    ///
    /// A new `frame` rewinds to offset 0. When the reservation does not fit, the
    /// capacity at least doubles (and is never below `min_size`). Uploads made
    /// earlier in the frame stay in the replaced buffer, which in-flight
    /// commands keep alive.
    pub(super) fn reserve(&mut self, frame: u64, len: u64, align: u64, min_size: u64) -> Slot {
        if frame != self.frame {
            self.frame = frame;
            self.offset = 0;
        }

        let start = self.offset.next_multiple_of(align.max(1));
        if self.capacity > 0 && start + len <= self.capacity {
            self.offset = start + len;
            return Slot::At(start);
        }

        let size = len
            .next_power_of_two()
            .max(self.capacity.saturating_mul(2))
            .max(min_size);
        self.capacity = size;
        self.offset = len;
        Slot::Grow { size }
    }
}

/// Result of [`StreamBuffer::upload`].
pub(super) struct Upload<'a> {
    pub buffer: &'a wgpu::Buffer,
    pub range: Range<u64>,
    /// The backing buffer was replaced; bind groups over it must be rebuilt.
    pub replaced: bool,
}

/// A growable GPU buffer written front to back during a frame.
pub(super) struct StreamBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    min_size: u64,
    buffer: Option<wgpu::Buffer>,
    cursor: StreamCursor,
}

impl StreamBuffer {
    pub(super) fn new(label: &'static str, usage: wgpu::BufferUsages, min_size: u64) -> Self {
        Self {
            label,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            min_size,
            buffer: None,
            cursor: StreamCursor::default(),
        }
    }

    /// Stages `bytes` behind this frame's earlier uploads.
    ///
    /// `align` is the required offset alignment (at least the copy alignment is
    /// always applied). Returns `None` for empty uploads.
    pub(super) fn upload(&mut self, ctx: &RenderCtx<'_>, bytes: &[u8], align: u64) -> Option<Upload<'_>> {
        if bytes.is_empty() {
            return None;
        }

        let len = bytes.len() as u64;
        let padded = len.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let align = align.max(wgpu::COPY_BUFFER_ALIGNMENT);

        let (offset, replaced) = match self.cursor.reserve(ctx.frame_index, padded, align, self.min_size) {
            Slot::At(offset) => (offset, false),
            Slot::Grow { size } => {
                log::trace!("{}: growing to {size} bytes", self.label);
                self.buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(self.label),
                    size,
                    usage: self.usage,
                    mapped_at_creation: false,
                }));
                (0, true)
            }
        };

        let buffer = self.buffer.as_ref()?;
        if padded == len {
            ctx.queue.write_buffer(buffer, offset, bytes);
        } else {
            let mut staged = bytes.to_vec();
            staged.resize(padded as usize, 0);
            ctx.queue.write_buffer(buffer, offset, &staged);
        }

        Some(Upload {
            buffer,
            range: offset..offset + len,
            replaced,
        })
    }
}
