//! Liquidity commitment reconciliation.

use rust_decimal::Decimal;

use vmm_core::{
    to_integer_string, LiquidityProvision, LiquidityProvisionAmendment,
    LiquidityProvisionSubmission, MarketId, Transaction,
};

/// What to do about the commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiquidityCommand {
    Submit { commitment: Decimal, fee: Decimal },
    Amend { commitment: Decimal, fee: Decimal },
}

impl LiquidityCommand {
    /// Build the transaction. `commitment` is already in settlement-asset
    /// fixed-point units and is truncated to an integer string.
    pub fn into_transaction(self, market_id: &MarketId, reference: &str) -> Transaction {
        match self {
            Self::Submit { commitment, fee } => {
                Transaction::LiquidityProvisionSubmission(LiquidityProvisionSubmission {
                    market_id: market_id.clone(),
                    commitment_amount: to_integer_string(commitment),
                    fee: fee.normalize().to_string(),
                    reference: reference.to_string(),
                })
            }
            Self::Amend { commitment, fee } => {
                Transaction::LiquidityProvisionAmendment(LiquidityProvisionAmendment {
                    market_id: market_id.clone(),
                    commitment_amount: to_integer_string(commitment),
                    fee: fee.normalize().to_string(),
                    reference: reference.to_string(),
                })
            }
        }
    }
}

/// A commitment the agent has sent but the data node has not echoed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitmentTarget {
    pub commitment: Decimal,
    pub fee: Decimal,
}

impl CommitmentTarget {
    /// Same truncated commitment and fee.
    pub fn matches(&self, commitment: Decimal, fee: Decimal) -> bool {
        self.commitment.trunc() == commitment.trunc() && self.fee == fee
    }

    /// The stored provision already carries this commitment.
    pub fn is_reflected_by(&self, lp: &LiquidityProvision) -> bool {
        self.matches(lp.commitment_amount, lp.fee)
    }
}

impl From<&LiquidityCommand> for CommitmentTarget {
    fn from(command: &LiquidityCommand) -> Self {
        match *command {
            LiquidityCommand::Submit { commitment, fee }
            | LiquidityCommand::Amend { commitment, fee } => Self { commitment, fee },
        }
    }
}

/// Decide whether the commitment needs to change.
///
/// Commitments are compared on their truncated integer value, the only
/// form the exchange accepts. Size and fee changes travel in one amendment.
pub fn reconcile(
    current: Option<&LiquidityProvision>,
    commitment: Decimal,
    fee: Decimal,
) -> Option<LiquidityCommand> {
    match current {
        None => Some(LiquidityCommand::Submit { commitment, fee }),
        Some(lp) if CommitmentTarget { commitment, fee }.is_reflected_by(lp) => None,
        Some(_) => Some(LiquidityCommand::Amend { commitment, fee }),
    }
}

/// Like [`reconcile`], but against what was last sent while the store has
/// not caught up with it. A pending commitment is amended, never
/// resubmitted.
pub fn reconcile_pending(
    current: Option<&LiquidityProvision>,
    pending: Option<&CommitmentTarget>,
    commitment: Decimal,
    fee: Decimal,
) -> Option<LiquidityCommand> {
    match pending {
        Some(p) if current.is_some_and(|lp| p.is_reflected_by(lp)) => {
            reconcile(current, commitment, fee)
        }
        Some(p) if p.matches(commitment, fee) => None,
        Some(_) => Some(LiquidityCommand::Amend { commitment, fee }),
        None => reconcile(current, commitment, fee),
    }
}
