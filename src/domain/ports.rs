use super::detection::RawDetection;
use super::input::ImageInput;
use super::payment::{PaymentEvent, PaymentId, PaymentSpec, TxId};
use super::session::{IncompletePayment, Scope, User};
use crate::error::Result;
use async_trait::async_trait;
use image::RgbaImage;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Parameters passed to `WalletSdk::init`.
#[derive(Debug, Clone, PartialEq)]
pub struct SdkInit {
    pub version: String,
    pub sandbox: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub user: User,
    /// Reported by the wallet when an earlier payment was never completed.
    pub incomplete_payment: Option<IncompletePayment>,
}

/// Ordered callbacks of a single payment. The stream ends after the terminal event.
pub type PaymentEvents = mpsc::Receiver<PaymentEvent>;

/// Fetches and evaluates the wallet SDK.
#[async_trait]
pub trait SdkLoader: Send + Sync {
    async fn load(&self, script_url: &str) -> Result<WalletSdkBox>;
}

#[async_trait]
pub trait WalletSdk: Send + Sync {
    async fn init(&self, init: &SdkInit) -> Result<()>;
    async fn authenticate(&self, scopes: &[Scope]) -> Result<AuthOutcome>;
    /// Starts a payment. `cancel` is forwarded as-is; wallets without cancellation ignore it.
    async fn create_payment(
        &self,
        spec: PaymentSpec,
        cancel: CancellationToken,
    ) -> Result<PaymentEvents>;
}

/// Server-side half of the payment handshake.
#[async_trait]
pub trait PaymentServer: Send + Sync {
    async fn approve(&self, payment_id: &PaymentId) -> Result<()>;
    async fn complete(&self, payment_id: &PaymentId, txid: &TxId) -> Result<()>;
}

#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<DetectionModelBox>;
}

#[async_trait]
pub trait DetectionModel: Send + Sync {
    async fn detect(
        &self,
        image: &ImageInput,
        cancel: CancellationToken,
    ) -> Result<Vec<RawDetection>>;
}

/// Produces a fresh displayable image: a file upload or a camera capture.
#[async_trait]
pub trait ImageProducer: Send + Sync {
    async fn produce(&self) -> Result<ImageInput>;
}

/// Live camera feed.
pub trait Camera: Send + Sync {
    fn current_frame(&self) -> Result<RgbaImage>;
}

/// Blocking alert / inline message shown to the user.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

pub type SdkLoaderBox = Box<dyn SdkLoader>;
pub type WalletSdkBox = Box<dyn WalletSdk>;
pub type PaymentServerBox = Box<dyn PaymentServer>;
pub type ModelLoaderBox = Box<dyn ModelLoader>;
pub type DetectionModelBox = Box<dyn DetectionModel>;
pub type NotifierBox = Box<dyn Notifier>;
