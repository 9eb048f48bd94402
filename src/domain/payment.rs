use crate::error::{AppError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Positive amount of Pi requested by a payment.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ONE: Self = Self(Decimal::ONE);

    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(AppError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AppError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Identifier the wallet SDK assigns to a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub String);

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Blockchain transaction id reported once the user has signed the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxId(pub String);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the controller asks the wallet to pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSpec {
    pub amount: Amount,
    pub memo: String,
    /// Opaque data forwarded untouched to the SDK.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentState {
    Created,
    ReadyForServerApproval,
    ReadyForServerCompletion,
    Completed,
    Cancelled,
    Errored,
}

impl PaymentState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentState::Completed | PaymentState::Cancelled | PaymentState::Errored
        )
    }
}

/// Callbacks the wallet SDK fires for a payment, delivered in order on the payment's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    ReadyForServerApproval(PaymentId),
    ReadyForServerCompletion(PaymentId, TxId),
    Cancelled(PaymentId),
    Failed {
        error: String,
        payment: Option<PaymentId>,
    },
}

impl PaymentEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PaymentEvent::ReadyForServerApproval(_) => "ready_for_server_approval",
            PaymentEvent::ReadyForServerCompletion(_, _) => "ready_for_server_completion",
            PaymentEvent::Cancelled(_) => "cancel",
            PaymentEvent::Failed { .. } => "error",
        }
    }

    fn payment_id(&self) -> Option<&PaymentId> {
        match self {
            PaymentEvent::ReadyForServerApproval(id)
            | PaymentEvent::ReadyForServerCompletion(id, _)
            | PaymentEvent::Cancelled(id) => Some(id),
            PaymentEvent::Failed { payment, .. } => payment.as_ref(),
        }
    }
}

/// The single payment the controller tracks.
///
/// The id is unknown until the SDK reports it in the first callback; every later
/// callback must carry the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: Option<PaymentId>,
    pub spec: PaymentSpec,
    pub state: PaymentState,
    pub txid: Option<TxId>,
    pub error: Option<String>,
    /// Every state the payment has been in, starting with `Created`.
    pub history: Vec<PaymentState>,
}

impl Payment {
    pub fn new(spec: PaymentSpec) -> Self {
        Self {
            id: None,
            spec,
            state: PaymentState::Created,
            txid: None,
            error: None,
            history: vec![PaymentState::Created],
        }
    }

    /// Applies an SDK callback and returns the new state.
    pub fn apply(&mut self, event: &PaymentEvent) -> Result<PaymentState> {
        if self.state.is_terminal() {
            return Err(AppError::invalid_transition(self.state, event));
        }
        if let Some(id) = event.payment_id() {
            self.adopt_id(id)?;
        }

        let next = match (self.state, event) {
            (PaymentState::Created, PaymentEvent::ReadyForServerApproval(_)) => {
                PaymentState::ReadyForServerApproval
            }
            (
                PaymentState::ReadyForServerApproval,
                PaymentEvent::ReadyForServerCompletion(_, txid),
            ) => {
                self.txid = Some(txid.clone());
                PaymentState::ReadyForServerCompletion
            }
            (_, PaymentEvent::Cancelled(_)) => PaymentState::Cancelled,
            (_, PaymentEvent::Failed { error, .. }) => {
                self.error = Some(error.clone());
                PaymentState::Errored
            }
            (from, event) => return Err(AppError::invalid_transition(from, event)),
        };
        self.enter(next);
        Ok(next)
    }

    /// Marks the payment completed once the server side has acknowledged the transaction.
    pub fn complete(&mut self) -> Result<()> {
        if self.state != PaymentState::ReadyForServerCompletion {
            return Err(AppError::InvalidTransition {
                from: self.state,
                event: "complete",
            });
        }
        self.enter(PaymentState::Completed);
        Ok(())
    }

    /// Forces a non-terminal payment into `Errored`. Terminal payments are left alone.
    pub fn fail(&mut self, message: impl Into<String>) {
        if !self.state.is_terminal() {
            self.error = Some(message.into());
            self.enter(PaymentState::Errored);
        }
    }

    fn adopt_id(&mut self, id: &PaymentId) -> Result<()> {
        match &self.id {
            Some(known) if known != id => Err(AppError::PaymentError {
                payment_id: Some(known.clone()),
                message: format!("callback for unrelated payment {id}"),
            }),
            Some(_) => Ok(()),
            None => {
                self.id = Some(id.clone());
                Ok(())
            }
        }
    }

    fn enter(&mut self, state: PaymentState) {
        self.state = state;
        self.history.push(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn spec() -> PaymentSpec {
        PaymentSpec {
            amount: Amount::new(dec!(1.0)).unwrap(),
            memo: "Test Payment".to_string(),
            metadata: Map::new(),
        }
    }

    fn id() -> PaymentId {
        PaymentId("pay-1".to_string())
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_amount_display_is_normalized() {
        assert_eq!(Amount::new(dec!(1.0)).unwrap().to_string(), "1");
        assert_eq!(Amount::new(dec!(0.50)).unwrap().to_string(), "0.5");
    }

    #[test]
    fn test_payment_spec_deserializes_numeric_amount() {
        let spec: PaymentSpec =
            serde_json::from_str(r#"{"amount": 1.0, "memo": "m", "metadata": {"orderId": 1234}}"#)
                .unwrap();
        assert_eq!(spec.amount.value(), dec!(1.0));
        assert_eq!(spec.metadata["orderId"], 1234);

        let zero = serde_json::from_str::<PaymentSpec>(r#"{"amount": 0, "memo": "m"}"#);
        assert!(zero.is_err());
    }

    #[test]
    fn test_happy_path_reaches_completed() {
        let mut payment = Payment::new(spec());
        payment
            .apply(&PaymentEvent::ReadyForServerApproval(id()))
            .unwrap();
        payment
            .apply(&PaymentEvent::ReadyForServerCompletion(
                id(),
                TxId("tx-1".to_string()),
            ))
            .unwrap();
        payment.complete().unwrap();

        assert_eq!(payment.state, PaymentState::Completed);
        assert_eq!(payment.id, Some(id()));
        assert_eq!(payment.txid, Some(TxId("tx-1".to_string())));
        assert_eq!(
            payment.history,
            vec![
                PaymentState::Created,
                PaymentState::ReadyForServerApproval,
                PaymentState::ReadyForServerCompletion,
                PaymentState::Completed,
            ]
        );
    }

    #[test]
    fn test_completion_before_approval_is_rejected() {
        let mut payment = Payment::new(spec());
        let result = payment.apply(&PaymentEvent::ReadyForServerCompletion(
            id(),
            TxId("tx-1".to_string()),
        ));
        assert!(matches!(
            result,
            Err(AppError::InvalidTransition {
                from: PaymentState::Created,
                ..
            })
        ));
        assert_eq!(payment.state, PaymentState::Created);
    }

    #[test]
    fn test_complete_requires_server_completion_state() {
        let mut payment = Payment::new(spec());
        payment
            .apply(&PaymentEvent::ReadyForServerApproval(id()))
            .unwrap();
        assert!(payment.complete().is_err());
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut payment = Payment::new(spec());
        payment
            .apply(&PaymentEvent::ReadyForServerApproval(id()))
            .unwrap();
        payment.apply(&PaymentEvent::Cancelled(id())).unwrap();
        assert_eq!(payment.state, PaymentState::Cancelled);

        // Nothing may follow a terminal state
        let late = payment.apply(&PaymentEvent::ReadyForServerCompletion(
            id(),
            TxId("tx-1".to_string()),
        ));
        assert!(late.is_err());
        assert_eq!(payment.state, PaymentState::Cancelled);
    }

    #[test]
    fn test_error_records_message() {
        let mut payment = Payment::new(spec());
        payment
            .apply(&PaymentEvent::Failed {
                error: "user rejected".to_string(),
                payment: None,
            })
            .unwrap();
        assert_eq!(payment.state, PaymentState::Errored);
        assert_eq!(payment.error.as_deref(), Some("user rejected"));
        assert_eq!(payment.id, None);
    }

    #[test]
    fn test_mismatched_payment_id_is_rejected() {
        let mut payment = Payment::new(spec());
        payment
            .apply(&PaymentEvent::ReadyForServerApproval(id()))
            .unwrap();
        let other = payment.apply(&PaymentEvent::Cancelled(PaymentId("pay-2".to_string())));
        assert!(matches!(other, Err(AppError::PaymentError { .. })));
        assert_eq!(payment.state, PaymentState::ReadyForServerApproval);
    }

    #[test]
    fn test_fail_leaves_terminal_payment_untouched() {
        let mut payment = Payment::new(spec());
        payment.apply(&PaymentEvent::Cancelled(id())).unwrap();
        payment.fail("stream closed");
        assert_eq!(payment.state, PaymentState::Cancelled);
        assert_eq!(payment.error, None);
    }
}
