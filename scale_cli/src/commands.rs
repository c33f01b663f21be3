//! Subcommand implementations.

use std::io::{BufRead, Write};
use std::sync::atomic::Ordering;
use std::time::SystemTime;

use eyre::{Result, WrapErr};
use scale_config::Config;
use scale_core::conversions::simulator;
use scale_core::payload::simulated_payload;
use scale_core::{
    LoopExit, ReconnectPolicy, SampleEvent, SamplingLoop, WeightPayload, ZeroDebouncer,
    apply_override, run_supervised,
};
use scale_hardware::{LiveSerialSource, PortDescriptor, select_port};
use scale_traits::{MonotonicClock, WeightSource};
use tracing::{debug, info};

use crate::console;
use crate::interrupt::Interrupt;

/// Polls a snapshot makes before giving up on a parsed frame.
const SNAPSHOT_POLLS: usize = 5;

pub fn run_ports(json: bool) -> Result<()> {
    let ports: Vec<PortDescriptor> = LiveSerialSource::system().discover().collect();
    if json {
        println!("{}", console::ports_json(&ports));
    } else if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        for (i, p) in ports.iter().enumerate() {
            println!("{}", console::port_line(i, p));
        }
    }
    Ok(())
}

pub struct ReadArgs {
    pub port: Option<String>,
    pub simulate: bool,
    pub count: Option<u64>,
    pub raw: bool,
}

pub fn run_read(
    cfg: &Config,
    args: ReadArgs,
    json: bool,
    interrupt: &Interrupt,
) -> Result<()> {
    let shutdown = interrupt.shutdown_flag();
    let sampling: SamplingLoop = SamplingLoop::from(&cfg.sampling);
    let mut debounce = if args.raw {
        ZeroDebouncer::disabled()
    } else {
        ZeroDebouncer::from(&cfg.debounce)
    };
    let mut printed = 0u64;
    let limit = args.count;
    let stop = shutdown.clone();
    let consumer = move |event: SampleEvent| match event {
        SampleEvent::Reading(r) => {
            let display = r.reading.value_kg().map(|kg| debounce.apply(kg));
            if json {
                println!("{}", console::json_row(&r, display));
            } else {
                println!("{}", console::row(&r, display));
            }
            printed += 1;
            if limit.is_some_and(|n| printed >= n) {
                stop.store(true, Ordering::Relaxed);
            }
        }
        SampleEvent::Terminal(e) => {
            if json {
                println!("{}", console::status_json(&e, SystemTime::now()));
            } else {
                eprintln!("Connection problem: {e}");
            }
        }
    };

    let exit = if args.simulate {
        let mut source = simulator(&cfg.simulation);
        interrupt.arm();
        info!(
            target_kg = source.target_weight(),
            cycle_s = source.simulation().cycle_seconds(),
            "reading simulated scale"
        );
        sampling.run(&mut source, &shutdown, consumer)
    } else {
        let mut source = open_live(cfg, args.port.as_deref(), json)?;
        interrupt.arm();
        let policy = ReconnectPolicy::from(&cfg.reconnect);
        run_supervised(&mut source, &sampling, &policy, &shutdown, consumer)
    };

    match exit {
        LoopExit::Interrupted => {
            debug!("reader stopped");
            Ok(())
        }
        LoopExit::Terminated(e) => Err(e.into()),
    }
}

pub fn run_snapshot(
    cfg: &Config,
    port: Option<&str>,
    simulate: bool,
    override_body: Option<&str>,
    json: bool,
) -> Result<()> {
    if simulate {
        let source = simulator(&cfg.simulation);
        if let Some(body) = override_body {
            let response = apply_override(&source, body)?;
            println!("{}", serde_json::to_string(&response)?);
        }
        let payload = simulated_payload(&source, &MonotonicClock::new());
        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }

    let mut source = open_live(cfg, port, json)?;
    let sampling: SamplingLoop = SamplingLoop::default();
    for _ in 0..SNAPSHOT_POLLS {
        match sampling.poll_once(&mut source) {
            Some(SampleEvent::Reading(r)) => {
                let connected = source.is_connected();
                if let Some(payload) =
                    WeightPayload::from_reading(&r, cfg.simulation.target_weight_kg, connected)
                {
                    println!("{}", serde_json::to_string(&payload)?);
                    return Ok(());
                }
                debug!(raw = %r.reading.raw_text, "skipping unparsed frame");
            }
            Some(SampleEvent::Terminal(e)) => return Err(e.into()),
            None => {}
        }
    }
    let name = source.port_name().unwrap_or_default().to_string();
    eyre::bail!("no weight reading received from {name} after {SNAPSHOT_POLLS} polls")
}

/// Open the serial scale named on the command line, in the config, or
/// chosen interactively.
fn open_live(cfg: &Config, port: Option<&str>, json: bool) -> Result<LiveSerialSource> {
    let mut source = LiveSerialSource::system();
    if let Some(cmd) = cfg.serial.request.as_deref() {
        source = source.with_request(cmd);
    }
    let name = match port.or(cfg.serial.port.as_deref()) {
        Some(p) => {
            let ports: Vec<_> = source.discover().collect();
            select_port(&ports, p).ok_or_else(|| eyre::eyre!("no port selected"))?
        }
        None => prompt_for_port(&source.discover().collect::<Vec<_>>(), json)?,
    };
    source.open(&name)?;
    info!(port = %name, "reading serial scale");
    Ok(source)
}

fn prompt_for_port(ports: &[PortDescriptor], json: bool) -> Result<String> {
    if ports.is_empty() {
        eyre::bail!("no serial ports found");
    }
    let mut err = std::io::stderr().lock();
    if !json {
        writeln!(err, "Available ports:")?;
        for (i, p) in ports.iter().enumerate() {
            writeln!(err, "{}", console::port_line(i, p))?;
        }
    }
    write!(err, "Select port (number or name): ")?;
    err.flush()?;
    drop(err);

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .wrap_err("read port selection")?;
    select_port(ports, &line).ok_or_else(|| eyre::eyre!("no port selected"))
}
