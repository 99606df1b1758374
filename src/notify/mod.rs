//! Applicant notification collaborator.
//!
//! Delivery is best-effort: `notify` never reports failure to the caller, and
//! a lost notification never undoes the status change that produced it.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::models::workflow::ProposalStatus;

/// Descriptor of a status change, emitted once per successful lifecycle write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub proposal_id: String,
    pub new_status: ProposalStatus,
    pub rationale: Option<String>,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: StatusEvent);
}

/// Writes each event to the application log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: StatusEvent) {
        match &event.rationale {
            Some(r) => log::info!(
                "Notify applicant: proposal {} is now {} ({})",
                event.proposal_id,
                event.new_status,
                r
            ),
            None => log::info!(
                "Notify applicant: proposal {} is now {}",
                event.proposal_id,
                event.new_status
            ),
        }
    }
}

/// Forwards events to a channel consumed by a delivery task.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<StatusEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: StatusEvent) {
        if let Err(e) = self.tx.send(event) {
            log::warn!(
                "Dropping notification for proposal {}: receiver closed",
                e.0.proposal_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_notifier_delivers_events() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(StatusEvent {
            proposal_id: "p1".to_string(),
            new_status: ProposalStatus::Approved,
            rationale: None,
        });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.proposal_id, "p1");
        assert_eq!(event.new_status, ProposalStatus::Approved);
    }

    #[test]
    fn closed_channel_does_not_panic() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(StatusEvent {
            proposal_id: "p1".to_string(),
            new_status: ProposalStatus::Rejected,
            rationale: Some("Out of scope".to_string()),
        });
    }
}
