use crate::service::{Action, QuotaStatus, UserTier};

use super::FlowError;

/// Facts gathered before an action is accepted.
#[derive(Debug, Clone)]
pub struct GuardContext {
    pub tier: UserTier,
    pub quota: QuotaStatus,
    pub action: Action,
    pub has_pending_link: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionGuard {
    Quota,
    TierRestriction,
    PendingLink,
}

/// Evaluated in this order; the first failure wins.
pub const ACTION_GUARDS: [ActionGuard; 3] = [ActionGuard::Quota, ActionGuard::TierRestriction, ActionGuard::PendingLink];

impl ActionGuard {
    pub fn check(&self, ctx: &GuardContext) -> Result<(), FlowError> {
        match self {
            ActionGuard::Quota => match ctx.quota {
                QuotaStatus::LimitReached { limit } => Err(FlowError::QuotaExceeded { limit }),
                QuotaStatus::Allowed { .. } => Ok(()),
            },
            ActionGuard::TierRestriction => {
                if ctx.action == Action::Takeaways && !ctx.tier.is_paid() {
                    Err(FlowError::TierRestricted)
                } else {
                    Ok(())
                }
            }
            ActionGuard::PendingLink => {
                if ctx.has_pending_link {
                    Ok(())
                } else {
                    Err(FlowError::NoPendingLink)
                }
            }
        }
    }
}

pub fn run_guards(guards: &[ActionGuard], ctx: &GuardContext) -> Result<(), FlowError> {
    for guard in guards {
        if let Err(e) = guard.check(ctx) {
            info!("Action {:?} denied by {:?} guard: {}", ctx.action, guard, e);
            return Err(e);
        }
    }
    Ok(())
}
