//! Feed assembly and the per-view refresh loop.

mod assembler;
mod refresh;
mod view;

pub use assembler::{DEFAULT_FETCH_TIMEOUT, FeedAssembler};
pub use refresh::{DEFAULT_REFRESH_INTERVAL, LoopState, RefreshHandle, RefreshLoop};
pub use view::{FeedSnapshot, FeedView};
