use crate::domain::payment::{PaymentId, TxId};
use crate::domain::ports::{Notifier, PaymentServer};
use crate::error::Result;
use async_trait::async_trait;

/// Stand-in for the app's backend: approval and completion are only logged.
///
/// A real backend would call the wallet platform's `/payments/{id}/approve`
/// and `/payments/{id}/complete` endpoints with a server API key.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPaymentServer;

#[async_trait]
impl PaymentServer for LoggingPaymentServer {
    async fn approve(&self, payment_id: &PaymentId) -> Result<()> {
        log::info!("Server approval requested for payment {payment_id}");
        Ok(())
    }

    async fn complete(&self, payment_id: &PaymentId, txid: &TxId) -> Result<()> {
        log::info!("Server completion requested for payment {payment_id} (txid {txid})");
        Ok(())
    }
}

/// Prints alerts to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("Alert: {message}");
    }
}
