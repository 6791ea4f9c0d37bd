use wolctl::hwaddr::HardwareAddr;
use wolctl::machines::{Machine, MachineStore};
use wolctl::wol;
use wolctl::wol::WakeDestination;

use clap::{Parser, Subcommand};
use log::info;
use std::net::ToSocketAddrs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the machine list.
    #[arg(long, env = "WOLCTL_MACHINES", default_value = "machines.json")]
    machines: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a magic packet to one or more machines, each given as a
    /// stored name or a raw hardware address in xx:xx:xx:xx:xx:xx form.
    Wake {
        targets: Vec<String>,

        /// Override the destination host for every target.
        #[arg(long)]
        host: Option<String>,

        /// Override the destination port for every target.
        #[arg(long)]
        port: Option<u16>,
    },
    /// List the stored machines.
    List,
    /// Store a machine under a name.
    Add {
        name: String,

        /// Hardware address in xx:xx:xx:xx:xx:xx form.
        addr: String,

        /// Host the magic packet will be sent to.
        #[arg(long, default_value = "255.255.255.255")]
        host: String,

        /// Port the magic packet will be sent to.
        #[arg(long, default_value_t = wol::DEFAULT_PORT)]
        port: u16,

        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Remove a machine from the list.
    Remove { name: String },
}

/// Resolves a host name or IP literal into a wake destination.
fn destination(host: &str, port: u16) -> Result<WakeDestination, Box<dyn std::error::Error>> {
    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| format!("{host:?} did not resolve to any address"))?;
    Ok(WakeDestination::new(addr.ip(), addr.port()))
}

fn wake_target(
    store: &MachineStore,
    target: &str,
    host: Option<&str>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let default_host = wol::DEFAULT_HOST.to_string();
    let (addr, record_host, record_port): (HardwareAddr, &str, u16) = match store.get(target) {
        Some(machine) => (
            machine.hardware_addr.parse()?,
            machine.host.as_str(),
            machine.port,
        ),
        // Not a stored name: the target has to be a raw address.
        None => (
            target
                .parse()
                .map_err(|_| format!("{target:?} is neither a stored machine nor a hardware address"))?,
            default_host.as_str(),
            wol::DEFAULT_PORT,
        ),
    };
    let dest = destination(host.unwrap_or(record_host), port.unwrap_or(record_port))?;
    wol::wake_to(addr, dest)?;
    info!("sent magic packet for {addr} to {dest}");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("INFO"))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();

    let mut store = MachineStore::load(&args.machines)?;

    match args.command {
        Command::Wake {
            targets,
            host,
            port,
        } => {
            if targets.is_empty() {
                return Err("no targets given".into());
            }
            for target in &targets {
                wake_target(&store, target, host.as_deref(), port)?;
            }
        }
        Command::List => {
            if store.is_empty() {
                println!("no machines stored in {}", store.path().display());
            }
            for m in store.machines() {
                if m.comment.is_empty() {
                    println!("{}\t{}\t{}:{}", m.name, m.hardware_addr, m.host, m.port);
                } else {
                    println!(
                        "{}\t{}\t{}:{}\t# {}",
                        m.name, m.hardware_addr, m.host, m.port, m.comment
                    );
                }
            }
        }
        Command::Add {
            name,
            addr,
            host,
            port,
            comment,
        } => {
            // Stored as text, but it has to parse now, not at wake time.
            let parsed: HardwareAddr = addr.parse()?;
            let machine = Machine {
                name,
                comment,
                hardware_addr: parsed.to_string(),
                host,
                port,
            };
            store.add(machine)?;
            store.save()?;
        }
        Command::Remove { name } => {
            if store.remove(&name).is_none() {
                return Err(format!("no machine named {name:?}").into());
            }
            store.save()?;
        }
    }
    Ok(())
}
