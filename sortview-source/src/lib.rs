//! An observable list that reports its changes as row ranges.
//!
//! [`ObservableList`] is the kind of source sequence a `sortview::SortProxy`
//! presents a sorted view of. Every mutation is broadcast to subscribers as a
//! [`SourceUpdate`]: the [`SourceChange`] itself (data changed, rows inserted,
//! rows removed, or reset) plus a cheap snapshot of the list right after that
//! change.
//!
//! Cargo features:
//!
//! - `tracing`: Emit [tracing] events when updates are sent out
//! - `serde`: Implement `serde::Serialize` for [`SourceChange`]

mod list;

pub use list::{ListTransaction, ObservableList, SourceChange, SourceSubscriber, SourceUpdate};

#[doc(no_inline)]
pub use imbl::Vector;
