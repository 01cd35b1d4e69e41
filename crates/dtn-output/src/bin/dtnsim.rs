//! `dtnsim` — the simulation runner (spec.md §6 CLI).
//!
//! Wires config loading, the tick loop, output writers, and metrics
//! reporting together. `-nv` and any visualization/plotting flags are
//! accepted and ignored rather than rejected (visualization is an external
//! collaborator, out of scope per spec.md §1).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use dtn_output::config::{build_sim, load_agents, load_model, RoutingProtocolKind};
use dtn_output::{contact_io, csv::CsvWriter, json::JsonSnapshotWriter, metrics_report, observer::SimOutputObserver};
use dtn_sim::{NoopObserver, Summary};

#[derive(Parser, Debug)]
#[command(name = "dtnsim", about = "DTN routing simulator")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the agents JSON document.
    #[arg(short = 'a', long = "agents", default_value = "agents.json")]
    agents: PathBuf,

    /// Path to the model JSON document.
    #[arg(short = 'm', long = "model", default_value = "model.json")]
    model: PathBuf,

    /// Backbone routing protocol override (0=CGR, 1=Epidemic, 2=Spray).
    #[arg(short = 'r', long = "rp")]
    routing_protocol: Option<u8>,

    /// Accepted for compatibility; visualization is out of scope here.
    #[arg(short = 'n', long = "nv")]
    no_viz: bool,

    /// Run N independent batch trials instead of one.
    #[arg(short = 'b', long = "batch", default_value_t = 0)]
    batch: u32,

    #[arg(long = "correctness")]
    correctness: bool,

    #[arg(long = "debug")]
    debug: bool,

    #[arg(long = "log-metrics")]
    log_metrics: bool,

    /// Capture radio-connected router pairs into a contact plan (0 or 1;
    /// this simulator does not distinguish "routers only" from "all nodes"
    /// — see DESIGN.md).
    #[arg(long = "make-contact-plan")]
    make_contact_plan: Option<u8>,

    /// Where to write the captured contact plan, if requested.
    #[arg(long = "contact-plan-out", default_value = "out/contact_plan.json")]
    contact_plan_out: PathBuf,
}

/// Contact-plan formats (CSV, JSON) are interchangeable; `verify` checks
/// a plan for duplicate ids and inverted time windows without running a
/// simulation (spec.md §6).
#[derive(Subcommand, Debug)]
enum Command {
    /// Load a contact plan and report any well-formedness issues.
    Verify {
        /// Path to a contact plan, CSV or JSON (format chosen by extension).
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new().filter_level(level).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("dtnsim: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    if let Some(Command::Verify { path }) = &args.command {
        return run_verify(path);
    }

    run_sim(args)
}

fn run_verify(path: &PathBuf) -> Result<(), String> {
    let contacts = contact_io::load(path).map_err(|e| e.to_string())?;
    let issues = contact_io::verify(&contacts);
    if issues.is_empty() {
        println!("{path:?}: ok, {} contacts", contacts.len());
        return Ok(());
    }
    for issue in &issues {
        println!("{issue}");
    }
    Err(format!("{} issue(s) found", issues.len()))
}

fn run_sim(args: &Args) -> Result<(), String> {
    let mut model = load_model(&args.model).map_err(|e| e.to_string())?;
    let agent_entries = load_agents(&args.agents).map_err(|e| e.to_string())?;

    if let Some(code) = args.routing_protocol {
        model.routing_protocol = match code {
            0 => RoutingProtocolKind::Cgr,
            1 => RoutingProtocolKind::Epidemic,
            2 => RoutingProtocolKind::Spray,
            other => return Err(format!("-rp: unrecognized routing protocol {other}")),
        };
    }

    let capture_contacts = args.make_contact_plan.is_some() || model.make_contact_plan;
    let correctness = args.correctness || model.correctness;
    let log_metrics = args.log_metrics || model.log_metrics;

    let routing_protocol_name = match model.routing_protocol {
        RoutingProtocolKind::Cgr => "cgr",
        RoutingProtocolKind::Epidemic => "epidemic",
        RoutingProtocolKind::Spray => "spray",
    };

    let summaries = if args.batch > 0 {
        run_batch(&model, &agent_entries, args.batch, capture_contacts, correctness)?
    } else {
        vec![run_single(&model, &agent_entries, capture_contacts, correctness, args)?]
    };

    if log_metrics {
        let timestamp = model.scenario_name.clone();
        let report = if summaries.len() > 1 {
            metrics_report::write_batch_report(&model.title, &model.scenario_name, routing_protocol_name, &timestamp, &summaries)
        } else {
            metrics_report::write_single_trial_report(&model.title, &model.scenario_name, routing_protocol_name, &timestamp, &summaries[0])
        };
        report.map_err(|e| e.to_string())?;
    }

    Ok(())
}

fn run_single(
    model: &dtn_output::config::ModelConfig,
    agent_entries: &[serde_json::Value],
    capture_contacts: bool,
    correctness: bool,
    args: &Args,
) -> Result<Summary, String> {
    let mut sim = build_sim(model, agent_entries, capture_contacts, Some(correctness)).map_err(|e| e.to_string())?;

    let out_dir = PathBuf::from("out");
    let json_writer = JsonSnapshotWriter::new(&out_dir).map_err(|e| e.to_string())?;
    let csv_writer = CsvWriter::new(&out_dir).map_err(|e| e.to_string())?;
    let mut observer = SimOutputObserver::new(json_writer, Some(csv_writer));

    sim.run(&mut observer).map_err(|e| e.to_string())?;
    if let Some(err) = observer.take_error() {
        log::warn!("output write error: {err}");
    }

    if capture_contacts {
        if let Some(contacts) = sim.contact_plan() {
            contact_io::save(&args.contact_plan_out, &contacts).map_err(|e| e.to_string())?;
        }
    }

    Ok(sim.metrics_summary())
}

fn run_batch(
    model: &dtn_output::config::ModelConfig,
    agent_entries: &[serde_json::Value],
    trials: u32,
    capture_contacts: bool,
    correctness: bool,
) -> Result<Vec<Summary>, String> {
    let mut summaries = Vec::with_capacity(trials as usize);
    for i in 0..trials {
        let mut trial_model = model.clone();
        trial_model.seed = model.seed.wrapping_add(i as u64);
        let mut sim = build_sim(&trial_model, agent_entries, capture_contacts, Some(correctness)).map_err(|e| e.to_string())?;
        sim.run(&mut NoopObserver).map_err(|e| e.to_string())?;
        log::info!("trial {}/{} complete", i + 1, trials);
        summaries.push(sim.metrics_summary());
    }
    Ok(summaries)
}
