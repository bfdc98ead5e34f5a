//! Consistency checks on resources that have already passed schema validation.
//!
//! Each validator runs its checks in a fixed order and reports the first one that fails.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::resources::{IncomingPayment, OutgoingPayment, Quote};
use crate::error::InvariantViolation;

pub fn validate_incoming_payment(payment: &IncomingPayment) -> Result<(), InvariantViolation> {
    let Some(incoming_amount) = &payment.incoming_amount else {
        return Ok(());
    };

    match incoming_amount.checked_cmp(
        &payment.received_amount,
        ("Incoming amount", "received amount"),
    )? {
        Ordering::Less => Err(InvariantViolation::ReceivedExceedsIncoming),
        Ordering::Equal if !payment.completed => {
            Err(InvariantViolation::IncomingAmountReachedButNotCompleted)
        }
        _ => Ok(()),
    }
}

/// Validate an incoming payment returned from creation: nothing received, not completed.
pub fn validate_created_incoming_payment(
    payment: &IncomingPayment,
) -> Result<(), InvariantViolation> {
    if !payment.received_amount.value.is_zero() {
        return Err(InvariantViolation::NonZeroReceivedAmount);
    }

    if payment.completed {
        return Err(InvariantViolation::CreatedCompleted);
    }

    validate_incoming_payment(payment)
}

pub fn validate_completed_incoming_payment(
    payment: &IncomingPayment,
) -> Result<(), InvariantViolation> {
    if !payment.completed {
        return Err(InvariantViolation::NotCompleted);
    }

    validate_incoming_payment(payment)
}

/// Validate a quote against the current time `now`.
pub fn validate_quote(quote: &Quote, now: DateTime<Utc>) -> Result<(), InvariantViolation> {
    if quote.debit_amount.value.is_zero() {
        return Err(InvariantViolation::ZeroDebitAmount);
    }

    if quote.receive_amount.value.is_zero() {
        return Err(InvariantViolation::ZeroReceiveAmount);
    }

    match quote.expires_at {
        Some(expires_at) if expires_at <= now => Err(InvariantViolation::QuoteExpired(expires_at)),
        _ => Ok(()),
    }
}

pub fn validate_outgoing_payment(payment: &OutgoingPayment) -> Result<(), InvariantViolation> {
    let ordering = payment
        .debit_amount
        .checked_cmp(&payment.sent_amount, ("Debit amount", "sent amount"))?;

    match ordering {
        Ordering::Less => Err(InvariantViolation::SentExceedsDebit),
        Ordering::Equal if payment.failed && !payment.debit_amount.value.is_zero() => {
            Err(InvariantViolation::FailedButFullySent)
        }
        _ => Ok(()),
    }
}

/// Validate an outgoing payment returned from creation: nothing sent, not failed.
pub fn validate_created_outgoing_payment(
    payment: &OutgoingPayment,
) -> Result<(), InvariantViolation> {
    if !payment.sent_amount.value.is_zero() {
        return Err(InvariantViolation::NonZeroSentAmount);
    }

    if payment.failed {
        return Err(InvariantViolation::CreatedFailed);
    }

    validate_outgoing_payment(payment)
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;
    use crate::{
        core::amount::Amount,
        tests::{mock_incoming_payment, mock_outgoing_payment, mock_quote},
    };

    fn incoming(incoming: u64, received: u64, completed: bool) -> IncomingPayment {
        IncomingPayment {
            incoming_amount: Some(Amount::new(incoming, "USD", 2)),
            received_amount: Amount::new(received, "USD", 2),
            completed,
            ..mock_incoming_payment()
        }
    }

    #[test]
    fn incoming_payment_amount_ordering() {
        for (incoming_value, received_value, completed) in [
            (10, 0, false),
            (10, 5, false),
            (10, 9, true),
            (10, 10, true),
            (0, 0, true),
        ] {
            let payment = incoming(incoming_value, received_value, completed);
            assert_eq!(validate_incoming_payment(&payment), Ok(()));
        }

        assert_eq!(
            validate_incoming_payment(&incoming(10, 10, false)),
            Err(InvariantViolation::IncomingAmountReachedButNotCompleted)
        );
        assert_eq!(
            validate_incoming_payment(&incoming(10, 11, true)),
            Err(InvariantViolation::ReceivedExceedsIncoming)
        );
    }

    #[test]
    fn incoming_payment_without_incoming_amount() {
        let payment = IncomingPayment {
            incoming_amount: None,
            received_amount: Amount::new(1_000u64, "EUR", 9),
            ..mock_incoming_payment()
        };
        assert_eq!(validate_incoming_payment(&payment), Ok(()));
    }

    #[test]
    fn incoming_payment_asset_mismatch_wins() {
        let scale = IncomingPayment {
            received_amount: Amount::new(20u64, "USD", 4),
            ..incoming(10, 0, false)
        };
        let code = IncomingPayment {
            received_amount: Amount::new(20u64, "EUR", 2),
            ..incoming(10, 0, false)
        };

        for payment in [scale, code] {
            assert_eq!(
                validate_incoming_payment(&payment),
                Err(InvariantViolation::AssetMismatch(
                    "Incoming amount",
                    "received amount"
                ))
            );
        }
    }

    #[test]
    fn created_incoming_payment() {
        assert_eq!(validate_created_incoming_payment(&incoming(10, 0, false)), Ok(()));
        assert_eq!(
            validate_created_incoming_payment(&incoming(10, 1, false)),
            Err(InvariantViolation::NonZeroReceivedAmount)
        );
        assert_eq!(
            validate_created_incoming_payment(&incoming(10, 0, true)),
            Err(InvariantViolation::CreatedCompleted)
        );
    }

    #[test]
    fn completed_incoming_payment() {
        assert_eq!(validate_completed_incoming_payment(&incoming(10, 10, true)), Ok(()));
        assert_eq!(validate_completed_incoming_payment(&incoming(10, 2, true)), Ok(()));
        assert_eq!(
            validate_completed_incoming_payment(&incoming(10, 2, false)),
            Err(InvariantViolation::NotCompleted)
        );
    }

    #[test]
    fn quote_amounts_and_expiry() {
        let now = Utc::now();
        let quote = mock_quote();
        assert_eq!(validate_quote(&quote, now), Ok(()));

        let expires_at = now - Duration::seconds(1);
        let expired = Quote {
            expires_at: Some(expires_at),
            ..quote.clone()
        };
        assert_eq!(
            validate_quote(&expired, now),
            Err(InvariantViolation::QuoteExpired(expires_at))
        );

        let zero_debit = Quote {
            debit_amount: Amount::new(0u64, "USD", 2),
            ..expired.clone()
        };
        assert_eq!(
            validate_quote(&zero_debit, now),
            Err(InvariantViolation::ZeroDebitAmount)
        );

        let zero_receive = Quote {
            receive_amount: Amount::new(0u64, "USD", 2),
            ..quote
        };
        assert_eq!(
            validate_quote(&zero_receive, now),
            Err(InvariantViolation::ZeroReceiveAmount)
        );
    }

    #[test]
    fn outgoing_payment_amounts() {
        let payment = mock_outgoing_payment();
        assert_eq!(validate_outgoing_payment(&payment), Ok(()));
        assert_eq!(validate_created_outgoing_payment(&payment), Ok(()));

        let overspent = OutgoingPayment {
            sent_amount: Amount::new(11u64, "USD", 2),
            ..payment.clone()
        };
        assert_eq!(
            validate_outgoing_payment(&overspent),
            Err(InvariantViolation::SentExceedsDebit)
        );

        let mismatched = OutgoingPayment {
            sent_amount: Amount::new(0u64, "EUR", 2),
            ..payment.clone()
        };
        assert_eq!(
            validate_outgoing_payment(&mismatched),
            Err(InvariantViolation::AssetMismatch("Debit amount", "sent amount"))
        );

        let failed_partial = OutgoingPayment {
            failed: true,
            sent_amount: Amount::new(4u64, "USD", 2),
            ..payment.clone()
        };
        assert_eq!(validate_outgoing_payment(&failed_partial), Ok(()));

        let failed_full = OutgoingPayment {
            failed: true,
            sent_amount: Amount::new(10u64, "USD", 2),
            ..payment
        };
        assert_eq!(
            validate_outgoing_payment(&failed_full),
            Err(InvariantViolation::FailedButFullySent)
        );
    }

    #[test]
    fn created_outgoing_payment() {
        let payment = mock_outgoing_payment();

        let sent = OutgoingPayment {
            sent_amount: Amount::new(1u64, "USD", 2),
            ..payment.clone()
        };
        assert_eq!(
            validate_created_outgoing_payment(&sent),
            Err(InvariantViolation::NonZeroSentAmount)
        );

        let failed = OutgoingPayment {
            failed: true,
            ..payment
        };
        assert_eq!(
            validate_created_outgoing_payment(&failed),
            Err(InvariantViolation::CreatedFailed)
        );
    }
}
