#![allow(dead_code)]

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use pivision::application::controller::UiController;
use pivision::config::{AppConfig, InferenceMode};
use pivision::domain::detection::RawDetection;
use pivision::domain::payment::{PaymentEvent, PaymentId, PaymentSpec, TxId};
use pivision::domain::ports::{
    AuthOutcome, Notifier, PaymentEvents, PaymentServer, SdkInit, SdkLoader, WalletSdk,
    WalletSdkBox,
};
use pivision::domain::session::{Scope, User};
use pivision::error::{AppError, Result};
use pivision::infrastructure::fixture_model::StaticModelLoader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub alerts: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerCall {
    Approve(PaymentId),
    Complete(PaymentId, TxId),
}

/// Records server calls; optionally rejects approvals.
#[derive(Clone, Default)]
pub struct RecordingServer {
    pub calls: Arc<Mutex<Vec<ServerCall>>>,
    pub reject_approval: bool,
}

impl RecordingServer {
    pub fn calls(&self) -> Vec<ServerCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentServer for RecordingServer {
    async fn approve(&self, payment_id: &PaymentId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ServerCall::Approve(payment_id.clone()));
        if self.reject_approval {
            return Err(AppError::PaymentError {
                payment_id: Some(payment_id.clone()),
                message: "approval endpoint returned 500".to_string(),
            });
        }
        Ok(())
    }

    async fn complete(&self, payment_id: &PaymentId, txid: &TxId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ServerCall::Complete(payment_id.clone(), txid.clone()));
        Ok(())
    }
}

/// Wallet that replays a fixed list of callbacks for every payment.
#[derive(Clone)]
pub struct ReplayWallet {
    pub events: Vec<PaymentEvent>,
    pub payments: Arc<Mutex<usize>>,
}

impl ReplayWallet {
    pub fn new(events: Vec<PaymentEvent>) -> Self {
        Self {
            events,
            payments: Arc::default(),
        }
    }

    pub fn payments(&self) -> usize {
        *self.payments.lock().unwrap()
    }
}

#[async_trait]
impl WalletSdk for ReplayWallet {
    async fn init(&self, _init: &SdkInit) -> Result<()> {
        Ok(())
    }

    async fn authenticate(&self, _scopes: &[Scope]) -> Result<AuthOutcome> {
        Ok(AuthOutcome {
            user: User {
                uid: "uid-1".to_string(),
                username: "replay".to_string(),
            },
            incomplete_payment: None,
        })
    }

    async fn create_payment(
        &self,
        _spec: PaymentSpec,
        _cancel: CancellationToken,
    ) -> Result<PaymentEvents> {
        *self.payments.lock().unwrap() += 1;
        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        for event in &self.events {
            tx.send(event.clone()).await.ok();
        }
        Ok(rx)
    }
}

/// Wallet that reports approval and then never calls back again.
///
/// The senders are kept so the payment stream stays open.
#[derive(Clone, Default)]
pub struct SilentWallet {
    pub senders: Arc<Mutex<Vec<mpsc::Sender<PaymentEvent>>>>,
}

impl SilentWallet {
    pub fn payments(&self) -> usize {
        self.senders.lock().unwrap().len()
    }
}

#[async_trait]
impl WalletSdk for SilentWallet {
    async fn init(&self, _init: &SdkInit) -> Result<()> {
        Ok(())
    }

    async fn authenticate(&self, _scopes: &[Scope]) -> Result<AuthOutcome> {
        Ok(AuthOutcome {
            user: User {
                uid: "uid-2".to_string(),
                username: "silent".to_string(),
            },
            incomplete_payment: None,
        })
    }

    async fn create_payment(
        &self,
        _spec: PaymentSpec,
        _cancel: CancellationToken,
    ) -> Result<PaymentEvents> {
        let (tx, rx) = mpsc::channel(1);
        tx.send(PaymentEvent::ReadyForServerApproval(pid("stuck"))).await.ok();
        self.senders.lock().unwrap().push(tx);
        Ok(rx)
    }
}

pub struct SilentLoader(pub SilentWallet);

#[async_trait]
impl SdkLoader for SilentLoader {
    async fn load(&self, _script_url: &str) -> Result<WalletSdkBox> {
        Ok(Box::new(self.0.clone()))
    }
}

pub struct ReplayLoader(pub ReplayWallet);

#[async_trait]
impl SdkLoader for ReplayLoader {
    async fn load(&self, _script_url: &str) -> Result<WalletSdkBox> {
        Ok(Box::new(self.0.clone()))
    }
}

pub fn pid(id: &str) -> PaymentId {
    PaymentId(id.to_string())
}

pub fn txid(id: &str) -> TxId {
    TxId(id.to_string())
}

pub fn dog() -> Vec<RawDetection> {
    vec![RawDetection {
        class: "dog".to_string(),
        score: 0.92,
    }]
}

pub fn config(mode: InferenceMode) -> AppConfig {
    AppConfig {
        inference_mode: mode,
        ..AppConfig::default()
    }
}

/// Controller wired to a replaying wallet and recording server/notifier.
pub fn replay_controller(
    mode: InferenceMode,
    wallet: ReplayWallet,
    server: RecordingServer,
    notifier: RecordingNotifier,
) -> UiController {
    UiController::new(
        config(mode),
        Box::new(ReplayLoader(wallet)),
        Box::new(server),
        Box::new(StaticModelLoader::new(dog())),
        Box::new(notifier),
    )
}

/// Writes a small solid-colour JPEG and returns its path.
pub fn write_photo(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(16, 12, Rgb([120, 80, 40]))
        .save(&path)
        .unwrap();
    path
}
