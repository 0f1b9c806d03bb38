//! Pure computation engines: epoch resolution, time-weighted averaging, and
//! pro-rata allocation. No I/O; everything here is a deterministic function
//! of its inputs.

pub mod allocator;
pub mod epochs;
pub mod twa;

pub use allocator::{allocate, total_allocated};
pub use epochs::{latest_distributed_per_gauge, resolve_gauge_infos, LatestDistribution};
pub use twa::{compute_twa, compute_twa_for_troves};
