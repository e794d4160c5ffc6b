pub mod frequency_buckets;
pub mod ghost_list;
pub mod intrusive_list;
#[cfg(feature = "concurrency")]
pub mod shard;
pub mod slot_arena;

pub use frequency_buckets::FrequencyBuckets;
pub use ghost_list::GhostList;
pub use intrusive_list::IntrusiveList;
#[cfg(feature = "concurrency")]
pub use shard::ShardSelector;
pub use slot_arena::{SlotArena, SlotId};
