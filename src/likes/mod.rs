pub mod domain;
pub mod locks;
pub mod toggle;

pub use domain::{CounterDelta, CounterPolicy, Counts, Relationship, ToggleAction, Transition};
pub use locks::KeyedLocks;
pub use toggle::{LikeToggler, ToggleOutcome};
