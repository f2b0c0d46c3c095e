//! Room membership implementation.
//!
//! - `table`: the membership table itself (plain data, no synchronization)
//! - `registry`: a single-writer actor task that owns the table and serves
//!   requests over a channel

pub mod registry;
pub mod table;

pub use registry::RoomRegistry;
pub use table::RoomTable;
