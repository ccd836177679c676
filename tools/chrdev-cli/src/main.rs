//! `chardevice`：在宿主机上加载字符设备子系统并驱动它
//!
//! ```text
//! chardevice --num-dev 2 demo
//! chardevice --params "num_dev=4 major=0" stress --threads 8
//! chardevice control --set 3
//! ```

use std::process::ExitCode;
use std::thread;

use chrdev::{
    CONTROL_PATH, ChrdevError, ChrdevSubsystem, Client, ModuleParams, NodeTable, OpenFlags,
};
use clap::{Parser, Subcommand};

const NODE_PREFIX: &str = "./chardevice";
const SAMPLE: &[u8] = b"THIS IS A SAMPLE CHARACTER DEVICE DRIVER\n";

#[derive(Parser)]
#[command(name = "chardevice")]
#[command(about = "Load the character device subsystem and exercise it", long_about = None)]
struct Cli {
    /// Requested major number (0 = dynamic)
    #[arg(long, default_value_t = 0)]
    major: u32,

    /// Number of device instances
    #[arg(long, default_value_t = chrdev::DEFAULT_NUM_DEV)]
    num_dev: u32,

    /// Module parameter string, overrides --major and --num-dev
    #[arg(long)]
    params: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a sample string to device 0 and read it back
    Demo,
    /// Hammer every device from several threads and verify isolation
    Stress {
        /// Worker threads
        #[arg(long, default_value_t = 4)]
        threads: usize,
        /// Write/read rounds per thread
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
    },
    /// Set the control counter (optional) and drain it
    Control {
        /// New counter value, parsed like a kernel integer
        #[arg(long)]
        set: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("chardevice: run failed: {}", err);
            eprintln!("chardevice: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ChrdevError> {
    let params = match &cli.params {
        Some(cmdline) => ModuleParams::parse(cmdline)?,
        None => ModuleParams::new(cli.num_dev, cli.major)?,
    };
    log::info!(
        "chardevice: loading with num_dev={} major={}",
        params.num_dev,
        params.major
    );
    let sys = ChrdevSubsystem::load(params)?;
    let nodes = NodeTable::new();
    let paths = sys.bind_nodes(&nodes, NODE_PREFIX)?;
    log::info!("chardevice: bound {}", paths.join(", "));

    let result = match cli.command {
        Command::Demo => demo(&sys, &nodes),
        Command::Stress {
            threads,
            iterations,
        } => stress(&sys, &nodes, threads, iterations),
        Command::Control { set } => control(&sys, &nodes, set.as_deref()),
    };

    let unbound = sys.unbind_nodes(&nodes, NODE_PREFIX);
    sys.exit();
    result.and(unbound)
}

fn demo(sys: &ChrdevSubsystem, nodes: &NodeTable) -> Result<(), ChrdevError> {
    let client = Client::new(sys, nodes);
    let path = format!("{}0", NODE_PREFIX);

    let fd = client.open(&path, OpenFlags::O_RDWR)?;
    println!("fd = {}", fd);

    let mut before = [0u8; chrdev::DEVICE_BUFFER_SIZE];
    let n = client.read(fd, &mut before)?;
    print!("initial: {}", String::from_utf8_lossy(&before[..n]));

    client.write(fd, SAMPLE)?;
    let mut buf = vec![0u8; SAMPLE.len()];
    let n = client.read(fd, &mut buf)?;
    print!("{}", String::from_utf8_lossy(&buf[..n]));

    client.close(fd)
}

fn stress(
    sys: &ChrdevSubsystem,
    nodes: &NodeTable,
    threads: usize,
    iterations: usize,
) -> Result<(), ChrdevError> {
    let num_dev = sys.registry().len();

    thread::scope(|s| {
        let workers: Vec<_> = (0..threads)
            .map(|id| {
                s.spawn(move || -> Result<usize, ChrdevError> {
                    let client = Client::new(sys, nodes);
                    let path = format!("{}{}", NODE_PREFIX, id % num_dev);
                    let fd = client.open(&path, OpenFlags::O_RDWR)?;
                    let mut mismatches = 0;
                    for round in 0..iterations {
                        let data = format!("t{}-{}", id, round);
                        client.write(fd, data.as_bytes())?;
                        let mut buf = [0u8; chrdev::DEVICE_BUFFER_SIZE];
                        let n = client.read(fd, &mut buf)?;
                        // 共享设备的线程互相覆盖，但读到的必须是某一次完整写入
                        if !is_whole_record(&buf[..n]) {
                            mismatches += 1;
                        }
                    }
                    client.close(fd)?;
                    Ok(mismatches)
                })
            })
            .collect();

        let mut torn = 0;
        for worker in workers {
            match worker.join() {
                Ok(result) => torn += result?,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        println!(
            "{} threads x {} rounds over {} devices, {} torn reads",
            threads, iterations, num_dev, torn
        );
        Ok(())
    })
}

fn is_whole_record(data: &[u8]) -> bool {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.strip_prefix('t'))
        .and_then(|text| text.split_once('-'))
        .is_some_and(|(id, round)| id.parse::<usize>().is_ok() && round.parse::<usize>().is_ok())
}

fn control(
    sys: &ChrdevSubsystem,
    nodes: &NodeTable,
    set: Option<&str>,
) -> Result<(), ChrdevError> {
    let client = Client::new(sys, nodes);
    let fd = client.open(CONTROL_PATH, OpenFlags::O_RDWR)?;

    if let Some(value) = set {
        client.write(fd, value.as_bytes())?;
    }
    print!("{} = {}", CONTROL_PATH, sys.control().show());

    let mut buf = [0u8; 16];
    client.read(fd, &mut buf)?;
    print!("after read = {}", sys.control().show());

    client.close(fd)
}
