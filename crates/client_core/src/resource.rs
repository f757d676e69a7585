//! Load state of a remotely fetched value, plus the request tickets used to
//! discard stale responses.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(pub u64);

/// Hands out strictly increasing tickets.
#[derive(Debug, Default)]
pub struct RequestSequence {
    last_issued: u64,
}

impl RequestSequence {
    pub fn issue(&mut self) -> RequestTicket {
        self.last_issued += 1;
        RequestTicket(self.last_issued)
    }

    pub fn latest(&self) -> Option<RequestTicket> {
        (self.last_issued > 0).then_some(RequestTicket(self.last_issued))
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest() == Some(ticket)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RemoteResource<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> RemoteResource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A [`RemoteResource`] guarded by a [`RequestSequence`]: only the response
/// to the most recently issued request is accepted.
#[derive(Debug)]
pub struct TrackedResource<T> {
    state: RemoteResource<T>,
    sequence: RequestSequence,
}

impl<T> Default for TrackedResource<T> {
    fn default() -> Self {
        Self {
            state: RemoteResource::Idle,
            sequence: RequestSequence::default(),
        }
    }
}

impl<T> TrackedResource<T> {
    pub fn begin(&mut self) -> RequestTicket {
        self.state = RemoteResource::Loading;
        self.sequence.issue()
    }

    /// Returns `false` (and leaves the state alone) for a stale ticket.
    pub fn resolve(&mut self, ticket: RequestTicket, result: Result<T, String>) -> bool {
        if !self.sequence.is_current(ticket) {
            return false;
        }
        self.state = match result {
            Ok(value) => RemoteResource::Ready(value),
            Err(message) => RemoteResource::Failed(message),
        };
        true
    }

    pub fn state(&self) -> &RemoteResource<T> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RemoteResource<T> {
        &mut self.state
    }
}
