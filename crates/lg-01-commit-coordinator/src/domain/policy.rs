//! Endorsement acceptance policy.
//!
//! A proposal is accepted only when every endorser answered with the success
//! status. Evaluation never stops at the first bad response: every
//! disqualifying response contributes a cause, so the caller sees the full
//! picture.

use crate::domain::entities::{Endorsement, EndorsementResponse};
use tracing::{error, info};

/// Result of evaluating a set of endorsement responses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndorsementVerdict {
    pub all_good: bool,
    /// One human-readable cause per disqualifying response, in response order.
    pub causes: Vec<String>,
}

/// Evaluate responses against `success_status`.
pub fn evaluate_endorsements(
    responses: &[EndorsementResponse],
    success_status: u32,
) -> EndorsementVerdict {
    let mut causes = Vec::new();

    for response in responses {
        match &response.endorsement {
            Endorsement::Failed { cause } => {
                let message = format!(
                    "proposal to {} resulted in an error :: {}",
                    response.peer, cause
                );
                error!(peer = %response.peer, "{}", message);
                causes.push(message);
            }
            Endorsement::Endorsed(proposal) if proposal.status == success_status => {
                info!(peer = %response.peer, "proposal was good");
            }
            Endorsement::Endorsed(proposal) => {
                let message = format!(
                    "proposal to {} was bad: status {}, message \"{}\"",
                    response.peer, proposal.status, proposal.message
                );
                error!(peer = %response.peer, status = proposal.status, "{}", message);
                causes.push(message);
            }
        }
    }

    EndorsementVerdict {
        all_good: causes.is_empty(),
        causes,
    }
}

/// Payload of the first successful endorsement.
pub fn first_payload(responses: &[EndorsementResponse]) -> Option<&[u8]> {
    responses.iter().find_map(|response| match &response.endorsement {
        Endorsement::Endorsed(proposal) => Some(proposal.payload.as_slice()),
        Endorsement::Failed { .. } => None,
    })
}
