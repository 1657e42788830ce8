//! Single-slot hand-off between the capture thread and the pipeline.
//!
//! The pipeline always wants the newest sample block and never a queue of
//! stale ones, so the boundary is one overwrite-on-write slot: the
//! producer swaps a fresh block in (dropping whatever was there), the
//! consumer swaps it out. Neither side ever blocks.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// One block of mono samples as delivered by the capture side.
#[derive(Debug, Clone)]
pub struct SampleBlock {
    /// Samples for the configured channel, capture order
    pub samples: Vec<f32>,
}

impl SampleBlock {
    /// Wrap a sample vector.
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }
}

/// Lock-free single-slot block hand-off.
///
/// Shared as `Arc<BlockSlot>` between exactly one producer (the audio
/// callback) and one consumer (the frame loop). Dropping either side at
/// any time is safe; the consumer simply stops seeing new blocks.
#[derive(Debug, Default)]
pub struct BlockSlot {
    slot: ArcSwapOption<SampleBlock>,
}

impl BlockSlot {
    /// Create an empty slot.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: ArcSwapOption::empty(),
        })
    }

    /// Publish a block, replacing any unconsumed one.
    pub fn publish(&self, block: SampleBlock) {
        self.slot.store(Some(Arc::new(block)));
    }

    /// Take the newest block, leaving the slot empty. `None` means
    /// nothing new arrived since the last take.
    pub fn take(&self) -> Option<Arc<SampleBlock>> {
        self.slot.swap(None)
    }

    /// Whether a block is currently waiting.
    pub fn is_pending(&self) -> bool {
        self.slot.load().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_empties_the_slot() {
        let slot = BlockSlot::new();
        assert!(slot.take().is_none());

        slot.publish(SampleBlock::new(vec![1.0, 2.0]));
        assert!(slot.is_pending());

        let block = slot.take().unwrap();
        assert_eq!(block.samples, vec![1.0, 2.0]);
        assert!(slot.take().is_none());
    }

    #[test]
    fn newer_block_overwrites_older() {
        let slot = BlockSlot::new();
        slot.publish(SampleBlock::new(vec![1.0]));
        slot.publish(SampleBlock::new(vec![2.0]));
        assert_eq!(slot.take().unwrap().samples, vec![2.0]);
    }

    #[test]
    fn works_across_threads() {
        let slot = BlockSlot::new();
        let producer = Arc::clone(&slot);
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                producer.publish(SampleBlock::new(vec![i as f32]));
            }
        });
        handle.join().unwrap();
        assert_eq!(slot.take().unwrap().samples, vec![99.0]);
    }
}
