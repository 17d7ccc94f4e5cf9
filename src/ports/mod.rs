#[allow(unused_imports)]
pub mod event_store;
#[allow(unused_imports)]
pub mod read_store;

#[allow(unused_imports)]
pub use event_store::{EventStore, EventStoreError};
#[allow(unused_imports)]
pub use read_store::{PostView, ReadStore, Tunables, UserProfile};
