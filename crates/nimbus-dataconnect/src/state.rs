//! Latest-result state shared by the observable query references.

use chrono::{DateTime, Utc};
use nimbus_protocol::DataConnectError;

/// What observers of a query reference can read.
///
/// A successful fetch replaces `data` and clears `last_error`. A failed fetch
/// sets `last_error` and leaves `data` as it was, so observers keep showing
/// the last good result next to the error.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub last_error: Option<DataConnectError>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            last_error: None,
            updated_at: None,
        }
    }
}

impl<T> QueryState<T> {
    pub(crate) fn apply_data(&mut self, data: T) {
        self.data = Some(data);
        self.last_error = None;
        self.updated_at = Some(Utc::now());
    }

    pub(crate) fn apply_error(&mut self, error: DataConnectError) {
        self.last_error = Some(error);
    }

    /// True until the first publish of either kind.
    pub fn is_idle(&self) -> bool {
        self.data.is_none() && self.last_error.is_none()
    }
}

/// Read access to the latest state of an observable query reference.
pub trait ObservableQuery<T: Clone> {
    fn state(&self) -> QueryState<T>;

    fn data(&self) -> Option<T> {
        self.state().data
    }

    fn last_error(&self) -> Option<DataConnectError> {
        self.state().last_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_clears_error_and_error_keeps_data() {
        let mut state = QueryState::default();
        assert!(state.is_idle());

        state.apply_data("first");
        assert_eq!(state.data, Some("first"));
        assert!(state.updated_at.is_some());

        let stamped = state.updated_at;
        state.apply_error(DataConnectError::Transport("offline".into()));
        assert_eq!(state.data, Some("first"));
        assert_eq!(state.updated_at, stamped);
        assert!(state.last_error.is_some());

        state.apply_data("second");
        assert_eq!(state.data, Some("second"));
        assert!(state.last_error.is_none());
    }
}
