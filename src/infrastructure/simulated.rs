use crate::domain::payment::{PaymentEvent, PaymentId, PaymentSpec, TxId};
use crate::domain::ports::{AuthOutcome, PaymentEvents, SdkInit, SdkLoader, WalletSdk, WalletSdkBox};
use crate::domain::session::{IncompletePayment, Scope, User};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// How the simulated wallet plays out every payment it is asked to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PaymentScript {
    /// Approval, then completion with a transaction id.
    #[default]
    Complete,
    /// Approval, then the user cancels.
    Cancel,
    /// Approval, then the wallet reports an error.
    Fail,
    /// Approval, then no further callbacks.
    Stall,
}

/// Calls received by a `SimulatedWallet`, for assertions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletCalls {
    pub init: Vec<SdkInit>,
    pub authenticate: usize,
    pub scopes: Vec<Scope>,
    pub create_payment: Vec<PaymentSpec>,
}

/// In-process wallet that answers with scripted outcomes.
///
/// Clones share the same call log.
#[derive(Clone)]
pub struct SimulatedWallet {
    user: Option<User>,
    incomplete: Option<IncompletePayment>,
    script: PaymentScript,
    calls: Arc<RwLock<WalletCalls>>,
}

impl SimulatedWallet {
    /// A wallet that signs `username` in.
    pub fn new(username: &str) -> Self {
        Self {
            user: Some(User {
                uid: Uuid::new_v4().to_string(),
                username: username.to_string(),
            }),
            incomplete: None,
            script: PaymentScript::default(),
            calls: Arc::default(),
        }
    }

    /// A wallet whose authentication always fails.
    pub fn rejecting_auth() -> Self {
        Self {
            user: None,
            ..Self::new("")
        }
    }

    /// Reports an unfinished payment with the given identifier during authentication.
    pub fn with_incomplete_payment(mut self, identifier: &str) -> Self {
        self.incomplete = Some(IncompletePayment {
            identifier: PaymentId(identifier.to_string()),
            memo: "Test Payment".to_string(),
            txid: None,
        });
        self
    }

    pub fn with_payment_script(mut self, script: PaymentScript) -> Self {
        self.script = script;
        self
    }

    pub async fn calls(&self) -> WalletCalls {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl WalletSdk for SimulatedWallet {
    async fn init(&self, init: &SdkInit) -> Result<()> {
        self.calls.write().await.init.push(init.clone());
        Ok(())
    }

    async fn authenticate(&self, scopes: &[Scope]) -> Result<AuthOutcome> {
        {
            let mut calls = self.calls.write().await;
            calls.authenticate += 1;
            calls.scopes = scopes.to_vec();
        }
        let user = self.user.clone().ok_or_else(|| {
            AppError::AuthenticationFailure("user denied the authentication request".to_string())
        })?;
        Ok(AuthOutcome {
            user,
            incomplete_payment: self.incomplete.clone(),
        })
    }

    async fn create_payment(
        &self,
        spec: PaymentSpec,
        _cancel: CancellationToken,
    ) -> Result<PaymentEvents> {
        self.calls.write().await.create_payment.push(spec);

        let id = PaymentId(Uuid::new_v4().to_string());
        let mut events = vec![PaymentEvent::ReadyForServerApproval(id.clone())];
        match self.script {
            PaymentScript::Complete => events.push(PaymentEvent::ReadyForServerCompletion(
                id,
                TxId(Uuid::new_v4().simple().to_string()),
            )),
            PaymentScript::Cancel => events.push(PaymentEvent::Cancelled(id)),
            PaymentScript::Fail => events.push(PaymentEvent::Failed {
                error: "payment expired".to_string(),
                payment: Some(id),
            }),
            PaymentScript::Stall => {}
        }

        let (tx, rx) = mpsc::channel(events.len());
        for event in events {
            tx.send(event).await.map_err(|e| AppError::PaymentError {
                payment_id: None,
                message: e.to_string(),
            })?;
        }
        Ok(rx)
    }
}

/// Hands out a `SimulatedWallet`, or fails as if the SDK script could not be fetched.
#[derive(Clone)]
pub struct SimulatedLoader {
    wallet: Option<SimulatedWallet>,
    loads: Arc<AtomicUsize>,
}

impl SimulatedLoader {
    pub fn new(wallet: SimulatedWallet) -> Self {
        Self {
            wallet: Some(wallet),
            loads: Arc::default(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            wallet: None,
            loads: Arc::default(),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SdkLoader for SimulatedLoader {
    async fn load(&self, script_url: &str) -> Result<WalletSdkBox> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.wallet {
            Some(wallet) => Ok(Box::new(wallet.clone())),
            None => Err(AppError::SdkLoadFailure(format!(
                "could not fetch {script_url}"
            ))),
        }
    }
}
