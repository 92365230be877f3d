mod poller;

pub use poller::{poll_once, PollMessage, SnapshotPoller};
