/// Lifecycle state of an update driver.
#[derive(PartialEq, Eq)]
#[derive(Debug)]
#[derive(Copy, Clone, Default)]
pub enum State {
    /// Not attached to any host
    #[default]
    Uninitialized,
    /// Attached to a host and receiving stage callbacks
    Ready,
}

impl State {
    #[inline]
    pub fn is_ready(self) -> bool {
        self == State::Ready
    }
}
