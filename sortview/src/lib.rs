//! Order-stable sorted views over mutable sequences.
//!
//! A [`SortProxy`] keeps a [`Permutation`] from view rows to the rows of a
//! source sequence, sorted by a [`SortSpec`]. When the source changes or the
//! sort spec is replaced, it does not rebuild the view; it works out the
//! smallest set of block moves, insertions and removals that transform the
//! old view order into the new one and announces each of them to its
//! observers as a [`ViewChange`]. Observers that mirror the view (a list
//! widget, say) can thus keep per-row state across the change.
//!
//! The source is anything implementing [`SourceRows`]. The
//! [`sortview_source`] crate provides `ObservableList`, whose updates can be
//! fed to a proxy with [`SortProxy::apply`].
//!
//! Cargo features:
//!
//! - `tracing`: Emit [tracing] events for incoming source changes and
//!   outgoing view changes
//! - `serde`: Implement `serde::Serialize` for [`ViewChange`], [`SortOrder`]
//!   and [`CaseSensitivity`]

mod compare;
pub mod merge;
mod permutation;
mod proxy;
pub mod removal;
pub mod reorder;
mod source;

pub use self::{
    compare::{
        compare_values, CaseSensitivity, Comparator, SortKey, SortOrder, SortSpec, SortValue,
    },
    permutation::Permutation,
    proxy::{ObserverId, SortProxy, SortedView, ViewChange},
    source::SourceRows,
};

#[doc(no_inline)]
pub use sortview_source::{SourceChange, SourceUpdate};
