//! # Wallet Arithmetic
//!
//! The wallet log is the source of truth; a balance is the fold of it.
//!
//! ```text
//! deposit    +amount
//! withdrawal -amount
//! payment    -amount
//!
//! balance = Σ signed(tx)
//! ```
//!
//! The database keeps a cached balance next to each user and updates it in
//! the same transaction as the log append. [`fold_balance`] is what that
//! cache must always equal.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{TransactionType, WalletTransaction};
use crate::validation::validate_positive_amount;

impl TransactionType {
    /// Whether this kind adds to the balance.
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionType::Deposit)
    }

    /// Effect of `amount` on the balance.
    pub fn signed(&self, amount: Money) -> Money {
        if self.is_credit() {
            amount
        } else {
            -amount
        }
    }

    /// Lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Payment => "payment",
        }
    }
}

impl WalletTransaction {
    /// Effect of this entry on the balance.
    pub fn signed_amount(&self) -> Money {
        self.kind.signed(self.amount)
    }
}

/// Balance implied by a transaction log.
pub fn fold_balance<'a, I>(transactions: I) -> Money
where
    I: IntoIterator<Item = &'a WalletTransaction>,
{
    transactions.into_iter().map(|tx| tx.signed_amount()).sum()
}

/// Validates an amount about to be recorded.
///
/// ## Errors
/// `Validation` when `amount <= 0`.
pub fn validate_transaction_amount(amount: Money) -> CoreResult<()> {
    validate_positive_amount("amount", amount)?;
    Ok(())
}

/// Checks that a debit fits in the balance.
///
/// The ledger itself never blocks an overdraft; callers debiting the wallet
/// run this first.
///
/// ## Errors
/// `InsufficientBalance` when `required > available`.
pub fn ensure_sufficient(available: Money, required: Money) -> CoreResult<()> {
    if required > available {
        return Err(CoreError::InsufficientBalance {
            available,
            required,
        });
    }
    Ok(())
}
