use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cspmu_raw::arch::coresight::Pmiidr;
use cspmu_raw::vendor::{self, CnvlinkFilter, NvlinkC2cFilter, PcieFilter};
use cspmu_raw::RegisterLayout;

use nvcspmu::common::{CpuMask, FixedTopology, Topology};
use nvcspmu::host::{BoundPmu, MemoryDevice, PlatformDevice};
use nvcspmu::variant::{FilterTarget, NVIDIA_VARIANTS};
use nvcspmu::{
    find_variant, BackendRegistry, CounterKind, CspmuDevice, NameScheme, NvidiaBackend, PmuEvent,
    ProbeConfig,
};

#[derive(Parser, Debug)]
#[command(name = "nvcspmu")]
#[command(about = "Identify and program NVIDIA CoreSight PMUs")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(
        short,
        long,
        global = true,
        help = "Enable verbose logging (shows binding decisions and register writes)"
    )]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the variant match table
    List,

    /// Bind a PMU from its PMIIDR value and show what it exposes
    Identify {
        #[arg(long, value_parser = parse_u32, help = "Raw PMIIDR value (hex with 0x or decimal)")]
        pmiidr: u32,

        #[command(flatten)]
        placement: Placement,
    },

    /// Compute the filter register write for an event
    Filter {
        #[arg(long, value_parser = parse_u32, help = "Raw PMIIDR value (hex with 0x or decimal)")]
        pmiidr: u32,

        #[command(flatten)]
        program: Program,
    },

    /// Bind a PMU through its register resource file and program one filter
    Probe {
        #[arg(long, help = "Resource file mapping the PMU register page")]
        resource: PathBuf,

        #[arg(long, default_value = "nvidia_cspmu", help = "Device name for diagnostics")]
        name: String,

        #[command(flatten)]
        placement: Placement,

        #[command(flatten)]
        program: Program,
    },
}

#[derive(clap::Args, Debug)]
struct Placement {
    #[arg(long, help = "CPUs associated with the PMU (e.g. 0-71); defaults to all online CPUs")]
    cpus: Option<String>,

    #[arg(long, help = "Treat every associated CPU as belonging to this node instead of reading sysfs")]
    node: Option<u32>,
}

#[derive(clap::Args, Debug)]
struct Program {
    #[arg(long, value_parser = parse_u64, default_value = "0", help = "perf_event_attr.config1")]
    config1: u64,

    #[arg(long, conflicts_with = "cycle", help = "Hardware index of the general purpose counter")]
    counter: Option<u32>,

    #[arg(long, help = "Program the cycle counter filter")]
    cycle: bool,
}

impl Program {
    fn event(&self) -> PmuEvent {
        let counter = if self.cycle {
            CounterKind::Cycle
        } else {
            CounterKind::Event(self.counter.unwrap_or(0))
        };
        PmuEvent::new(0, self.config1, counter)
    }
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let value = parse_u64(s)?;
    u32::try_from(value).map_err(|_| format!("{s} does not fit in 32 bits"))
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
}

fn topology_for(placement: &Placement, config: &ProbeConfig) -> Arc<dyn Topology + Send + Sync> {
    match placement.node {
        Some(node) => Arc::new(FixedTopology::new().with_node(node, config.cpus.iter())),
        None => Arc::new(config.topology()),
    }
}

fn probe_config(placement: &Placement) -> anyhow::Result<ProbeConfig> {
    let config = ProbeConfig::auto_detect();
    match &placement.cpus {
        Some(list) => {
            let cpus = CpuMask::parse(list).with_context(|| format!("parsing --cpus {list}"))?;
            Ok(ProbeConfig::new(config.sysfs_root, cpus))
        }
        None => Ok(config),
    }
}

fn print_table() {
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10}  {:<28} {:<10} {:>6}  formats",
        "variant", "product", "mask", "filter", "default", "name", "scheme", "events"
    );
    for variant in NVIDIA_VARIANTS {
        let scheme = match variant.name_scheme {
            NameScheme::Socket => "socket",
            NameScheme::Sequential => "sequential",
        };
        let formats: Vec<_> = variant.format_attrs.iter().map(|f| f.name).collect();
        println!(
            "{:<12} {:>#10x} {:>#10x} {:>#10x} {:>#10x}  {:<28} {:<10} {:>6}  {}",
            variant.label,
            variant.match_id,
            variant.match_mask,
            variant.filter.mask,
            variant.filter.default,
            variant.name_pattern.as_str(),
            scheme,
            variant.event_attrs.len(),
            formats.join(",")
        );
    }
}

fn print_bound<D: CspmuDevice>(pmu: &BoundPmu<D>) {
    println!("name: {}", pmu.name());
    println!("format:");
    for format in pmu.format_attrs() {
        println!("  {:<12} {}", format.name, format.layout);
    }
    println!("events:");
    for event in pmu.event_attrs() {
        println!("  {:<32} {}", event.name, event.render());
    }
}

fn describe_ports(product_id: u32, filter: u32) -> String {
    match product_id {
        vendor::product::PCIE => {
            let layout = PcieFilter::from_reg_value(filter);
            format!("root ports {:?}", vendor::selected_ports(layout.to_reg_value()))
        }
        vendor::product::NVLINK_C2C0 | vendor::product::NVLINK_C2C1 => {
            let layout = NvlinkC2cFilter::from_reg_value(filter);
            format!("ports {:?}", vendor::selected_ports(layout.to_reg_value()))
        }
        vendor::product::CNVLINK => {
            let layout = CnvlinkFilter::from_reg_value(filter);
            format!("remote sockets {:?}", vendor::selected_ports(layout.to_reg_value()))
        }
        vendor::product::SCF => "no filter".to_string(),
        _ => format!("raw filter 0x{filter:08x}"),
    }
}

fn run_identify(pmiidr: u32, placement: &Placement) -> anyhow::Result<()> {
    let config = probe_config(placement)?;
    let registry = BackendRegistry::new();
    NvidiaBackend::register(&registry, topology_for(placement, &config))?;

    let device = MemoryDevice::new(config.dev_name.clone(), pmiidr, config.cpus.clone());
    let pmu = registry.probe(device).context("binding PMU")?;

    let id = Pmiidr::from_reg_value(pmiidr);
    println!(
        "implementer: 0x{:03x}  product: 0x{:03x}  variant: {}  revision: {}",
        id.implementer, id.product_id, id.variant, id.revision
    );
    println!("cpus: {}", pmu.device().associated_cpus());
    print_bound(&pmu);
    Ok(())
}

fn filter_target(counter: CounterKind) -> FilterTarget {
    match counter {
        CounterKind::Cycle => FilterTarget::Cycle,
        CounterKind::Event(index) => FilterTarget::Event { index },
    }
}

fn run_filter(pmiidr: u32, program: &Program) -> anyhow::Result<()> {
    if Pmiidr::implementer(pmiidr) != vendor::IMPLEMENTER_ID {
        bail!(
            "implementer 0x{:03x} is not NVIDIA (0x{:03x})",
            Pmiidr::implementer(pmiidr),
            vendor::IMPLEMENTER_ID
        );
    }

    let product_id = Pmiidr::product_id(pmiidr);
    let variant = find_variant(product_id);
    let event = program.event();
    let value = variant.filter.compute(event.config1);
    let target = filter_target(event.counter);
    let offset = target.offset()?;
    let register = match target {
        FilterTarget::Cycle => "PMCCFILTR".to_string(),
        FilterTarget::Event { index } => format!("PMEVFILTR{index}"),
    };

    println!("variant: {}", variant.label);
    println!(
        "write 0x{:08x} to {} (offset 0x{:03x}): {}",
        value,
        register,
        offset,
        describe_ports(product_id, value)
    );
    Ok(())
}

fn run_probe(
    resource: PathBuf,
    name: String,
    placement: &Placement,
    program: &Program,
) -> anyhow::Result<()> {
    let config = probe_config(placement)?
        .with_resource(resource)
        .with_dev_name(name);
    let Some(resource) = config.resource.clone() else {
        bail!("no resource file given");
    };

    let registry = BackendRegistry::new();
    NvidiaBackend::register(&registry, topology_for(placement, &config))?;

    let device = PlatformDevice::new(config.dev_name.clone(), &resource, config.cpus.clone());
    let pmu = registry
        .probe(device)
        .with_context(|| format!("binding PMU at {}", resource.display()))?;

    let event = program.event();
    pmu.set_event_filter(&event)
        .with_context(|| format!("programming filter of {}", pmu.name()))?;

    let offset = filter_target(event.counter).offset()?;
    let written = cspmu_raw::read_reg32(&resource, offset)?;

    tracing::info!(
        "{}: programmed register 0x{:03x} = 0x{:08x}",
        pmu.name(),
        offset,
        written
    );
    print_bound(&pmu);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging based on verbose flag, RUST_LOG wins when set
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match args.command {
        Command::List => {
            print_table();
            Ok(())
        }
        Command::Identify { pmiidr, placement } => run_identify(pmiidr, &placement),
        Command::Filter { pmiidr, program } => run_filter(pmiidr, &program),
        Command::Probe {
            resource,
            name,
            placement,
            program,
        } => run_probe(resource, name, &placement, &program),
    }
}
