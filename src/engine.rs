//! High-level orchestrator: build request → start probe → output.

use crate::{
    cli::{self, Args, OutputMode},
    error::{Result, TcpingError},
    formatter::{self, Formatter},
    prober::{ProbeEvent, Prober, ProberConfig},
    request::{ProbeId, ProbeRequestBuilder},
    stats::ProbeResult,
};
use tokio::{signal, sync::mpsc, time::Duration};

pub fn run(args: Args) -> Result<i32> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run_async(args))
}

async fn run_async(args: Args) -> Result<i32> {
    let (host, port) = cli::split_target(&args.address)?;
    let request = ProbeRequestBuilder::new()
        .with_id(ProbeId(1))
        .with_host(host)
        .with_port(port)
        .with_count(args.count)
        .build()?;

    if matches!(args.output_mode, OutputMode::Normal) {
        println!(
            "\n** Probing {}:{} with {} concurrent connects **",
            request.host, request.port, request.count
        );
    }

    let config =
        ProberConfig::default().with_connect_timeout(Duration::from_millis(args.timeout_ms));
    let prober = Prober::new(config);
    let fmt: Box<dyn Formatter> = formatter::from_mode(args.output_mode);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = prober.start(request, tx);

    /* Ctrl-C future */
    let sigint = signal::ctrl_c();
    tokio::pin!(sigint);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(ProbeEvent::Attempt(_, report)) => fmt.probe(&report),
                Some(ProbeEvent::Completed(_, result)) => {
                    fmt.summary(&result);
                    return Ok(exit_code(&result));
                }
                None => {
                    return Err(TcpingError::Other(anyhow::anyhow!(
                        "probe {} ended without a result",
                        handle.id()
                    )));
                }
            },
            _ = &mut sigint => {
                drop(handle);
                return Ok(1);
            }
        }
    }
}

/// Map a result to a conventional Unix exit code.
pub fn exit_code(result: &ProbeResult) -> i32 {
    if result.failed_count == 0 && result.total_count > 0 {
        0
    } else {
        1
    }
}
