use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use polygraph_lib::{
    AudioScript, CapabilityProbe, DeviceProbe, InputMethod, PlatformHints, SessionController,
    SessionStatus, SettingsStore, SimulatedDevices,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let debug_mode = std::env::var("POLYGRAPH_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    polygraph_lib::init_logging(debug_mode);

    let settings = match std::env::var_os("POLYGRAPH_SETTINGS") {
        Some(path) => SettingsStore::load(&PathBuf::from(path))?,
        None => Default::default(),
    };

    let statement = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    // A short burst of speech, then silence so the recording completes on its own.
    let devices = SimulatedDevices::new(
        AudioScript::speech(90, Duration::from_millis(1500)).then(30, Duration::from_millis(500)),
    );
    let hints = PlatformHints {
        user_agent: "polygraph-cli".into(),
        screen_width: 1920,
        ..PlatformHints::default()
    };
    let capabilities = DeviceProbe::new(&devices, hints).probe().await;

    let controller = SessionController::new(devices, capabilities, settings).await;
    if statement.trim().is_empty() {
        controller.set_input_method(InputMethod::Voice).await;
    } else {
        controller.set_input_method(InputMethod::Text).await;
        controller.set_statement_text(statement).await;
    }

    let mut views = controller.subscribe();
    controller.start_test().await?;
    log::info!("polygraph test running...");

    views
        .wait_for(|view| view.status == SessionStatus::Result)
        .await
        .context("session ended before producing a result")?;

    let result = controller
        .result()
        .await
        .ok_or_else(|| anyhow!("result state without a result"))?;
    controller.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    println!(
        "{} ({}% truth, {}% confidence)",
        result.analysis.label(),
        result.truth_probability,
        result.confidence
    );
    Ok(())
}
