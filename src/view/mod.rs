//! Button views and the state machine that decides what a click does.
//!
//! Discord components carry no server-side lifetime, so the view a button
//! belongs to is encoded in its custom id. A click is turned back into a
//! [`ViewState`] from that id and fed through [`ViewState::on`].

mod render;

pub use render::{JOB_PROMPT, RecordCard, RootView, SeaView};

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

/// Life span of the message's top-level view.
pub const ROOT_VIEW_TIMEOUT: Duration = Duration::from_secs(60);
/// Life span of the ephemeral view offered after a Job click.
pub const SEA_VIEW_TIMEOUT: Duration = Duration::from_secs(30);

const CUSTOM_ID_PREFIX: &str = "harbor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Top-level view live, Job button clickable
    Initial,
    /// Sea button offered to one user
    JobShown,
    /// Record revealed
    SeaShown,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    ClickJob,
    ClickSea,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Reply ephemerally with a fresh [`SeaView`]
    OfferSea,
    /// Pick a record and reply with its card
    RevealRecord,
    /// Attach a fresh [`RootView`] to the presented message
    ReplaceView,
    Ignore,
    /// Send nothing; Discord reports the interaction as failed
    Reject,
}

impl ViewState {
    pub fn on(self, event: ViewEvent) -> (ViewState, Reaction) {
        use Reaction::*;
        use ViewEvent::*;
        use ViewState::*;

        match (self, event) {
            (Initial, ClickJob) => (JobShown, OfferSea),
            (Initial, Timeout) => (Initial, ReplaceView),
            (JobShown, ClickSea) => (SeaShown, RevealRecord),
            (JobShown, Timeout) => (Expired, Ignore),
            (SeaShown, _) => (SeaShown, Ignore),
            (state, _) => (state, Reject),
        }
    }
}

/// A button decoded from its custom id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Job { generation: u64 },
    Sea { issued_at: DateTime<Utc> },
}

impl Control {
    pub fn parse(custom_id: &str) -> Option<Self> {
        let mut parts = custom_id.split(':');
        if parts.next()? != CUSTOM_ID_PREFIX {
            return None;
        }

        let control = match (parts.next()?, parts.next()?) {
            ("job", generation) => Control::Job {
                generation: generation.parse().ok()?,
            },
            ("sea", millis) => Control::Sea {
                issued_at: Utc.timestamp_millis_opt(millis.parse().ok()?).single()?,
            },
            _ => return None,
        };

        if parts.next().is_some() {
            return None;
        }
        Some(control)
    }

    pub fn custom_id(&self) -> String {
        match self {
            Control::Job { generation } => format!("{CUSTOM_ID_PREFIX}:job:{generation}"),
            Control::Sea { issued_at } => {
                format!("{CUSTOM_ID_PREFIX}:sea:{}", issued_at.timestamp_millis())
            }
        }
    }

    pub fn event(&self) -> ViewEvent {
        match self {
            Control::Job { .. } => ViewEvent::ClickJob,
            Control::Sea { .. } => ViewEvent::ClickSea,
        }
    }

    /// The state of the view this button belongs to.
    ///
    /// `live_generation` is the generation of the root view currently on the
    /// presented message, if any.
    pub fn state(&self, live_generation: Option<u64>, now: DateTime<Utc>) -> ViewState {
        match self {
            Control::Job { generation } if live_generation == Some(*generation) => {
                ViewState::Initial
            }
            Control::Sea { issued_at } => {
                let age = now.signed_duration_since(*issued_at);
                match age.to_std() {
                    Ok(age) if age < SEA_VIEW_TIMEOUT => ViewState::JobShown,
                    // issued in the future
                    Err(_) => ViewState::JobShown,
                    Ok(_) => ViewState::Expired,
                }
            }
            _ => ViewState::Expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_job_then_sea() {
        let (state, reaction) = ViewState::Initial.on(ViewEvent::ClickJob);
        assert_eq!(state, ViewState::JobShown);
        assert_eq!(reaction, Reaction::OfferSea);

        let (state, reaction) = state.on(ViewEvent::ClickSea);
        assert_eq!(state, ViewState::SeaShown);
        assert_eq!(reaction, Reaction::RevealRecord);
    }

    #[test]
    fn test_root_timeout_replaces() {
        assert_eq!(
            ViewState::Initial.on(ViewEvent::Timeout),
            (ViewState::Initial, Reaction::ReplaceView)
        );
    }

    #[test]
    fn test_child_timeout_has_no_handler() {
        assert_eq!(
            ViewState::JobShown.on(ViewEvent::Timeout),
            (ViewState::Expired, Reaction::Ignore)
        );
    }

    #[test]
    fn test_expired_rejects_clicks() {
        assert_eq!(ViewState::Expired.on(ViewEvent::ClickSea).1, Reaction::Reject);
        assert_eq!(ViewState::Expired.on(ViewEvent::ClickJob).1, Reaction::Reject);
    }

    #[test]
    fn test_revealed_is_terminal() {
        for event in [ViewEvent::ClickJob, ViewEvent::ClickSea, ViewEvent::Timeout] {
            assert_eq!(ViewState::SeaShown.on(event), (ViewState::SeaShown, Reaction::Ignore));
        }
    }

    #[test]
    fn test_custom_id_round_trip() {
        let issued_at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        for control in [Control::Job { generation: 9 }, Control::Sea { issued_at }] {
            assert_eq!(Control::parse(&control.custom_id()), Some(control));
        }
    }

    #[test]
    fn test_parse_rejects_foreign_ids() {
        assert_eq!(Control::parse("other:job:1"), None);
        assert_eq!(Control::parse("harbor:job:x"), None);
        assert_eq!(Control::parse("harbor:dock:1"), None);
        assert_eq!(Control::parse("harbor:job:1:2"), None);
        assert_eq!(Control::parse(""), None);
    }

    #[test]
    fn test_job_state_follows_generation() {
        let now = Utc::now();
        let job = Control::Job { generation: 3 };
        assert_eq!(job.state(Some(3), now), ViewState::Initial);
        assert_eq!(job.state(Some(4), now), ViewState::Expired);
        assert_eq!(job.state(None, now), ViewState::Expired);
    }

    #[test]
    fn test_sea_expires_after_thirty_seconds() {
        let issued_at = Utc::now();
        let sea = Control::Sea { issued_at };

        let fresh = issued_at + ChronoDuration::seconds(29);
        assert_eq!(sea.state(None, fresh), ViewState::JobShown);
        assert_eq!(
            sea.state(None, fresh).on(sea.event()).1,
            Reaction::RevealRecord
        );

        let stale = issued_at + ChronoDuration::seconds(31);
        assert_eq!(sea.state(None, stale), ViewState::Expired);
        assert_eq!(sea.state(None, stale).on(sea.event()).1, Reaction::Reject);
    }
}
