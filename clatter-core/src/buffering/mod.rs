//! Sample storage: the fixed-length collection window, the finished clip,
//! and the lock-free SPSC ring that feeds the playback callback.
//!
//! The ring uses `ringbuf::HeapRb<f32>`, whose `try_pop` is wait-free and
//! safe to call from the real-time audio callback.

pub mod clip;
pub mod window;

use ringbuf::{traits::Split, HeapRb};

pub use ringbuf::traits::{Consumer, Producer};

/// Producer half, held by the thread writing samples for playback.
pub type AudioProducer = ringbuf::HeapProd<f32>;

/// Consumer half, moved into the output callback.
pub type AudioConsumer = ringbuf::HeapCons<f32>;

/// Ring capacity: 2^16 = 65 536 f32 samples ≈ 1.4 s at 48 kHz.
/// Writers block once this much audio is queued ahead of the device.
pub const RING_CAPACITY: usize = 1 << 16;

/// Create a matched producer/consumer pair backed by a heap-allocated ring buffer.
pub fn create_audio_ring() -> (AudioProducer, AudioConsumer) {
    HeapRb::<f32>::new(RING_CAPACITY).split()
}
