//! Metrics text-file report, matching the source's `print_sim_results` /
//! `print_stats_for_one_trial` wording exactly so existing downstream
//! log-scrapers keep working.

use std::io::Write;
use std::path::PathBuf;

use dtn_sim::Summary;

use crate::OutputResult;

fn out_file_path(scenario_name: &str, routing_protocol: &str, timestamp: &str) -> PathBuf {
    let file_name = format!("{}_{}_{}.txt", scenario_name.replace(' ', "_"), routing_protocol, timestamp);
    PathBuf::from("out").join(file_name)
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "undefined".to_string())
}

/// Single-trial report (no stdev), mirrors `print_stats_for_one_trial`.
pub fn write_single_trial_report(title: &str, scenario_name: &str, routing_protocol: &str, timestamp: &str, summary: &Summary) -> OutputResult<String> {
    let mut lines = Vec::new();
    lines.push("============ Simulation Results ============".to_string());
    lines.push(title.to_string());
    lines.push(format!("Average payload delivery latency: {} ticks", fmt_opt(summary.avg_payload_delivery_latency)));
    lines.push(format!("Payload delivery success rate: {}%", fmt_opt(summary.delivery_success_rate.map(|r| r * 100.0))));
    lines.push(format!("Average bundle storage overhead: {}", summary.avg_bundle_storage_overhead));

    write_report(scenario_name, routing_protocol, timestamp, &lines)
}

/// Mean/stdev across `trials`, mirrors `print_sim_results`.
pub fn write_batch_report(title: &str, scenario_name: &str, routing_protocol: &str, timestamp: &str, trials: &[Summary]) -> OutputResult<String> {
    let num_trials = trials.len();
    let latencies: Vec<f64> = trials.iter().filter_map(|s| s.avg_payload_delivery_latency).collect();
    let rates: Vec<f64> = trials.iter().filter_map(|s| s.delivery_success_rate.map(|r| r * 100.0)).collect();
    let overheads: Vec<f64> = trials.iter().map(|s| s.avg_bundle_storage_overhead).collect();

    let mut lines = Vec::new();
    lines.push(format!("============ Simulation Results ({num_trials} Trials) ============"));
    lines.push(title.to_string());
    lines.push(format!(
        "Average payload delivery latency: {} ticks (stdev={})",
        fmt_opt(mean(&latencies)),
        fmt_opt(stdev(&latencies)),
    ));
    lines.push(format!(
        "Payload delivery success rate: {}% (stdev={})",
        fmt_opt(mean(&rates)),
        fmt_opt(stdev(&rates)),
    ));
    lines.push(format!(
        "Average bundle storage overhead: {} (stdev={})",
        fmt_opt(mean(&overheads)),
        fmt_opt(stdev(&overheads)),
    ));

    write_report(scenario_name, routing_protocol, timestamp, &lines)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

fn write_report(scenario_name: &str, routing_protocol: &str, timestamp: &str, lines: &[String]) -> OutputResult<String> {
    for line in lines {
        println!("{line}");
    }

    let path = out_file_path(scenario_name, routing_protocol, timestamp);
    std::fs::create_dir_all(path.parent().unwrap())?;
    let mut file = std::fs::File::create(&path)?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    Ok(path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_trial_report_has_no_stdev() {
        let summary = Summary {
            avg_payload_delivery_latency: Some(12.0),
            delivery_success_rate: Some(0.5),
            avg_bundle_storage_overhead: 3.0,
        };
        let dir = tempfile::tempdir().unwrap();
        let cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let result = write_single_trial_report("My Scenario", "my_scenario", "cgr", "t0", &summary);
        std::env::set_current_dir(cwd).unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn batch_report_computes_mean_and_stdev() {
        let trials = vec![
            Summary {
                avg_payload_delivery_latency: Some(10.0),
                delivery_success_rate: Some(0.5),
                avg_bundle_storage_overhead: 2.0,
            },
            Summary {
                avg_payload_delivery_latency: Some(20.0),
                delivery_success_rate: Some(0.7),
                avg_bundle_storage_overhead: 4.0,
            },
        ];
        assert_eq!(mean(&[10.0, 20.0]), Some(15.0));
        assert!(stdev(&[10.0, 20.0]).unwrap() > 0.0);

        let dir = tempfile::tempdir().unwrap();
        let cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let result = write_batch_report("Title", "scenario", "epidemic", "t1", &trials);
        std::env::set_current_dir(cwd).unwrap();
        assert!(result.is_ok());
    }
}
