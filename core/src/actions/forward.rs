use serde::{Deserialize, Serialize};

use cadence_types::TargetSide;

use super::Interact;
use crate::actor::ActorId;
use crate::host::Host;

/// Run every action attached to one side, passing the original caller and
/// target through.
///
/// The side's attachment list is checked out while it runs, so an attached
/// `forward` pointing back at the same actor finds nothing to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forward {
    #[serde(default)]
    pub who: TargetSide,
}

impl Interact for Forward {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        let actor = self.who.pick(caller, target);
        let Some(attachments) = host.attachments() else {
            return;
        };
        let mut actions = attachments.check_out(actor);
        if actions.is_empty() {
            return;
        }

        for action in &mut actions {
            action.interact(host, caller, target);
        }

        if let Some(attachments) = host.attachments() {
            attachments.check_in(actor, actions);
        }
    }
}
