use analog_sweep::{LoopbackWire, SimulatedAdc, SimulatedDac, SweepConfig, SweepDriver};
use tokio::runtime::Builder;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, readings to stdout
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting analog sweep");

    let runtime = Builder::new_current_thread()
        .thread_name("analog-sweep")
        .enable_all()
        .build()?;

    // A0 jumpered to A1
    let config = SweepConfig::default();
    let wire = LoopbackWire::default();
    let output = SimulatedDac::new(config.dac().clone(), wire.clone());
    let input = SimulatedAdc::loopback(config.adc().clone(), wire);
    let mut driver = SweepDriver::new(config, output, input);

    let stdout = std::io::stdout();
    let report = runtime.block_on(async {
        let mut out = stdout.lock();
        driver.run(&mut out).await
    });

    match report {
        Ok(report) => {
            info!("Analog sweep completed with {} readings", report.len());
            Ok(())
        }
        Err(e) => {
            error!("Analog sweep failed: {:#}", e);
            Err(e)
        }
    }
}
