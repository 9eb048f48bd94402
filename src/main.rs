use clap::Parser;
use miette::{IntoDiagnostic, Result};
use pivision::application::controller::UiController;
use pivision::config::{AppConfig, InferenceMode};
use pivision::domain::ports::{ModelLoaderBox, SdkLoaderBox};
use pivision::infrastructure::fixture_model::{FixtureModelLoader, UnavailableModelLoader};
use pivision::infrastructure::logging::{ConsoleNotifier, LoggingPaymentServer};
use pivision::infrastructure::simulated::{PaymentScript, SimulatedLoader, SimulatedWallet};
use pivision::infrastructure::still_camera::FileCamera;
use pivision::interfaces::image_source::{CameraCapture, FileUpload};
use pivision::interfaces::render::render;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured inference mode
    #[arg(long, value_enum)]
    mode: Option<InferenceMode>,

    /// Image file to upload
    #[arg(long, conflicts_with = "capture")]
    upload: Option<PathBuf>,

    /// Image file served as the live camera frame to capture
    #[arg(long)]
    capture: Option<PathBuf>,

    /// Run detection on the selected image
    #[arg(long)]
    analyze: bool,

    /// Pay the configured amount
    #[arg(long)]
    pay: bool,

    /// JSON file with canned detections used as the detection model
    #[arg(long)]
    model: Option<PathBuf>,

    /// Username the simulated wallet signs in
    #[arg(long, default_value = "pioneer")]
    username: String,

    /// Simulate a wallet SDK script that fails to load
    #[arg(long)]
    sdk_unavailable: bool,

    /// Simulate the user rejecting authentication
    #[arg(long)]
    auth_fail: bool,

    /// How the simulated wallet plays out the payment
    #[arg(long, value_enum, default_value_t = PaymentScript::Complete)]
    payment_outcome: PaymentScript,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path).into_diagnostic()?,
        None => AppConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.inference_mode = mode;
    }

    let wallet = if cli.auth_fail {
        SimulatedWallet::rejecting_auth()
    } else {
        SimulatedWallet::new(&cli.username)
    }
    .with_payment_script(cli.payment_outcome);

    let loader: SdkLoaderBox = if cli.sdk_unavailable {
        Box::new(SimulatedLoader::unavailable())
    } else {
        Box::new(SimulatedLoader::new(wallet))
    };

    let models: ModelLoaderBox = match cli.model {
        Some(path) => Box::new(FixtureModelLoader::new(path)),
        None => Box::new(UnavailableModelLoader),
    };

    let mut controller = UiController::new(
        config,
        loader,
        Box::new(LoggingPaymentServer),
        models,
        Box::new(ConsoleNotifier),
    );

    // Failures are logged and alerted by the controller; the view reflects them.
    if let Err(e) = controller.start().await {
        log::debug!("Start finished with: {e}");
    }

    if let Some(path) = cli.upload {
        if let Err(e) = controller.acquire_image(&FileUpload::new(path)).await {
            log::debug!("Upload finished with: {e}");
        }
    } else if let Some(path) = cli.capture {
        let capture = CameraCapture::new(FileCamera::new(path));
        if let Err(e) = controller.acquire_image(&capture).await {
            log::debug!("Capture finished with: {e}");
        }
    }

    if cli.analyze
        && let Err(e) = controller.analyze().await
    {
        log::debug!("Analysis finished with: {e}");
    }

    if cli.pay
        && let Err(e) = controller.pay().await
    {
        log::debug!("Payment finished with: {e}");
    }

    for line in render(&controller) {
        println!("{line}");
    }

    Ok(())
}
