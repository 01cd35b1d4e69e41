//! Model/Agents JSON loading (spec.md §6) and `Sim` construction.
//!
//! Both documents are parsed into `serde_json::Value` rather than a fixed
//! struct, mirroring the source's dict-of-dicts shape (`model.py`'s
//! `merge()` deep-merges two plain dicts) — a fixed struct per agent type
//! would force a tagged-union `Deserialize` impl that rejects exactly the
//! loosely-typed, defaults-plus-overrides documents this format allows.
//!
//! Deep-merge semantics: `model.py`'s `merge(source, destination)` walks
//! `agent_defaults` into each per-agent dict, but for scalar keys it has
//! defaults unconditionally overwrite whatever the per-agent dict already
//! held — the opposite of spec.md §6's documented contract ("per-agent
//! values win"). `merge_defaults` below implements the documented contract,
//! not the literal source behavior (see DESIGN.md).

use std::path::Path;

use serde_json::Value;

use dtn_agent::{Agent, ClientAgent, ClientState, FlatAgent, GroundPayloadHandler, Peripherals, RouterAgent, SimpleAgent};
use dtn_contact::ContactPlan;
use dtn_core::radio::{ObstacleGrid, PathLoss, RealData, RssiGrid, RssiSource, Shadowing};
use dtn_core::{AgentId, Bounds, Position, RadioParams, Radio, SimConfig};
use dtn_handshake::{ClientHandshake, RouterHandshake};
use dtn_mobility::{arc_pattern, circle_pattern, spiral_pattern, spline_pattern, FixedPattern, Movement, MovementPattern, WaypointsPattern};
use dtn_routing::{Cgr, Epidemic, RoutingProtocol, SprayAndWait};
use dtn_sim::{DropSchedule, DropScheduleEntry, Sim};

use crate::{ConfigError, ConfigResult};

/// `routing_protocol` selector (Model JSON, spec.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoutingProtocolKind {
    Cgr,
    Epidemic,
    Spray,
}

impl RoutingProtocolKind {
    fn from_code(code: u64) -> ConfigResult<Self> {
        match code {
            0 => Ok(Self::Cgr),
            1 => Ok(Self::Epidemic),
            2 => Ok(Self::Spray),
            other => Err(ConfigError::Missing(format!("routing_protocol: unrecognized code {other}"))),
        }
    }
}

/// Parsed Model JSON (spec.md §6).
#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub title: String,
    pub scenario_name: String,
    pub max_steps: u64,
    pub seed: u64,
    pub bounds: Bounds,
    pub rssi_noise_stdev: f32,
    pub model_speed_limit: f32,
    pub enable_walls: bool,
    pub host_router_mapping_timeout: u64,
    pub payload_lifespan: u64,
    pub bundle_lifespan: u64,
    pub routing_protocol: RoutingProtocolKind,
    pub rssi_source: Value,
    pub data_drop_schedule: Vec<DropScheduleEntry>,
    pub log_metrics: bool,
    pub correctness: bool,
    pub make_contact_plan: bool,
}

fn read_json(path: &Path) -> ConfigResult<Value> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn required<'a>(obj: &'a Value, key: &str) -> ConfigResult<&'a Value> {
    obj.get(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn required_u64(obj: &Value, key: &str) -> ConfigResult<u64> {
    required(obj, key)?.as_u64().ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn opt_f32(obj: &Value, key: &str, default: f32) -> f32 {
    obj.get(key).and_then(Value::as_f64).map(|v| v as f32).unwrap_or(default)
}

fn opt_u64(obj: &Value, key: &str, default: u64) -> u64 {
    obj.get(key).and_then(Value::as_u64).unwrap_or(default)
}

fn opt_bool(obj: &Value, key: &str, default: bool) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// `make_contact_plan` accepts `bool`, `"0"`, or `"1"` (spec.md §6).
fn parse_make_contact_plan(obj: &Value) -> bool {
    match obj.get("make_contact_plan") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "1",
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        _ => false,
    }
}

fn position_from(value: &Value) -> ConfigResult<Position> {
    let arr = value.as_array().ok_or_else(|| ConfigError::Missing("pos (expected [x, y])".to_string()))?;
    let x = arr.first().and_then(Value::as_f64).ok_or_else(|| ConfigError::Missing("pos[0]".to_string()))?;
    let y = arr.get(1).and_then(Value::as_f64).ok_or_else(|| ConfigError::Missing("pos[1]".to_string()))?;
    Ok(Position::new(x as f32, y as f32))
}

pub fn load_model(path: &Path) -> ConfigResult<ModelConfig> {
    let raw = read_json(path)?;

    let size = required(&raw, "size")?;
    let width = size.get(0).and_then(Value::as_f64).ok_or_else(|| ConfigError::Missing("size[0]".to_string()))?;
    let height = size.get(1).and_then(Value::as_f64).ok_or_else(|| ConfigError::Missing("size[1]".to_string()))?;

    let data_drop_schedule = raw
        .get("data_drop_schedule")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(drop_entry_from).collect::<ConfigResult<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();

    Ok(ModelConfig {
        title: raw.get("title").and_then(Value::as_str).unwrap_or("Untitled scenario").to_string(),
        scenario_name: raw.get("scenario_name").and_then(Value::as_str).unwrap_or("scenario").to_string(),
        max_steps: required_u64(&raw, "max_steps")?,
        seed: opt_u64(&raw, "seed", SimConfig::DEFAULT_SEED),
        bounds: Bounds::new(width as f32, height as f32),
        rssi_noise_stdev: opt_f32(&raw, "rssi_noise_stdev", 25.0),
        model_speed_limit: opt_f32(&raw, "model_speed_limit", f32::MAX),
        enable_walls: opt_bool(&raw, "enable_walls", true),
        host_router_mapping_timeout: opt_u64(&raw, "host_router_mapping_timeout", 100),
        payload_lifespan: opt_u64(&raw, "payload_lifespan", 1000),
        bundle_lifespan: opt_u64(&raw, "bundle_lifespan", 1000),
        routing_protocol: RoutingProtocolKind::from_code(opt_u64(&raw, "routing_protocol", 0))?,
        rssi_source: raw.get("rssi_source").cloned().unwrap_or(Value::String("path_loss".to_string())),
        data_drop_schedule,
        log_metrics: opt_bool(&raw, "log_metrics", false),
        correctness: opt_bool(&raw, "correctness", false),
        make_contact_plan: parse_make_contact_plan(&raw),
    })
}

fn drop_entry_from(value: &Value) -> ConfigResult<DropScheduleEntry> {
    let target_id = required(value, "target_id")?.as_str().ok_or_else(|| ConfigError::Missing("target_id".to_string()))?;
    let pos = position_from(required(value, "pos")?)?;
    let start_tick = required_u64(value, "start_tick")?;
    Ok(DropScheduleEntry {
        target_id: AgentId::new(target_id),
        pos,
        start_tick: dtn_core::Tick(start_tick),
        period: value.get("period").and_then(Value::as_u64),
        count: value.get("count").and_then(Value::as_u64),
    })
}

/// Construct the RSSI source named by `ModelConfig::rssi_source`.
///
/// Only `path_loss` is backed directly by Model JSON (`rssi_noise_stdev`).
/// `real_data`/`shadowing` name a companion grid file (`grid_file`, plus
/// `obstacle_file` for `shadowing`) holding a `{cell_size, values}` /
/// `{cell_size, walls}` document — a format this crate defines itself,
/// since no retrieved source carries real RF survey data (see DESIGN.md).
///
/// `enable_walls: false` (spec.md §6) degrades a `shadowing` source to a
/// bare `RealData` grid, skipping `obstacle_file` entirely — the model's
/// global switch for turning the obstacle grid off without having to
/// change `rssi_source.kind`.
fn build_rssi_source(spec: &Value, noise_stdev: f32, enable_walls: bool) -> ConfigResult<Box<dyn RssiSource>> {
    let kind = spec.get("kind").and_then(Value::as_str).or_else(|| spec.as_str()).unwrap_or("path_loss");
    match kind {
        "path_loss" => Ok(Box::new(PathLoss { noise_stdev })),
        "real_data" => {
            let grid_path = required(spec, "grid_file")?.as_str().ok_or_else(|| ConfigError::Missing("rssi_source.grid_file".to_string()))?;
            Ok(Box::new(RealData(load_rssi_grid(Path::new(grid_path))?)))
        }
        "shadowing" if !enable_walls => {
            let grid_path = required(spec, "grid_file")?.as_str().ok_or_else(|| ConfigError::Missing("rssi_source.grid_file".to_string()))?;
            Ok(Box::new(RealData(load_rssi_grid(Path::new(grid_path))?)))
        }
        "shadowing" => {
            let grid_path = required(spec, "grid_file")?.as_str().ok_or_else(|| ConfigError::Missing("rssi_source.grid_file".to_string()))?;
            let obstacle_path = required(spec, "obstacle_file")?.as_str().ok_or_else(|| ConfigError::Missing("rssi_source.obstacle_file".to_string()))?;
            Ok(Box::new(Shadowing {
                grid: load_rssi_grid(Path::new(grid_path))?,
                obstacles: load_obstacle_grid(Path::new(obstacle_path))?,
            }))
        }
        other => Err(ConfigError::Missing(format!("rssi_source: unrecognized kind {other}"))),
    }
}

fn load_rssi_grid(path: &Path) -> ConfigResult<RssiGrid> {
    let raw = read_json(path)?;
    let cell_size = required(&raw, "cell_size")?.as_f64().ok_or_else(|| ConfigError::Missing("cell_size".to_string()))? as f32;
    let values: Vec<Vec<f32>> = serde_json::from_value(required(&raw, "values")?.clone()).map_err(|source| ConfigError::Json {
        path: path.display().to_string(),
        source,
    })?;
    Ok(RssiGrid { cell_size, values })
}

fn load_obstacle_grid(path: &Path) -> ConfigResult<ObstacleGrid> {
    let raw = read_json(path)?;
    let cell_size = required(&raw, "cell_size")?.as_f64().ok_or_else(|| ConfigError::Missing("cell_size".to_string()))? as f32;
    let walls: Vec<Vec<bool>> = serde_json::from_value(required(&raw, "walls")?.clone()).map_err(|source| ConfigError::Json {
        path: path.display().to_string(),
        source,
    })?;
    Ok(ObstacleGrid { cell_size, walls })
}

/// Deep-merge `defaults` into `agent`, per-agent values winning at every
/// scalar leaf (spec.md §6's documented contract, not `model.py`'s actual
/// default-overwrites-per-agent behavior — see DESIGN.md).
fn merge_defaults(defaults: &Value, agent: &Value) -> Value {
    match (defaults, agent) {
        (Value::Object(defaults_map), Value::Object(agent_map)) => {
            let mut merged = defaults_map.clone();
            for (key, agent_value) in agent_map {
                match merged.get(key) {
                    Some(default_value) => {
                        merged.insert(key.clone(), merge_defaults(default_value, agent_value));
                    }
                    None => {
                        merged.insert(key.clone(), agent_value.clone());
                    }
                }
            }
            Value::Object(merged)
        }
        // Agent value is present and not an object pair with a default
        // object: it wins outright, including overriding a scalar default.
        (_, agent_value) => agent_value.clone(),
    }
}

/// Load Agents JSON (`{agent_defaults, agents}`) and return each entry with
/// `agent_defaults` merged in, per-agent values winning.
pub fn load_agents(path: &Path) -> ConfigResult<Vec<Value>> {
    let raw = read_json(path)?;
    let defaults = raw.get("agent_defaults").cloned().unwrap_or(Value::Object(serde_json::Map::new()));
    let agents = required(&raw, "agents")?.as_array().ok_or_else(|| ConfigError::Missing("agents".to_string()))?;
    Ok(agents.iter().map(|a| merge_defaults(&defaults, a)).collect())
}

fn build_movement(entry: &Value, start_pos: Position, model_speed_limit: f32) -> ConfigResult<Movement> {
    let Some(movement) = entry.get("movement") else {
        return Ok(Movement::new(MovementPattern::Fixed(FixedPattern::new(start_pos)), f32::MAX, model_speed_limit));
    };
    let speed = opt_f32(movement, "speed", 1.0);
    let pattern_name = movement.get("pattern").and_then(Value::as_str).unwrap_or("fixed");
    let options = movement.get("options").cloned().unwrap_or(Value::Object(serde_json::Map::new()));

    let pattern = match pattern_name {
        "fixed" => {
            let pos = options.get("pos").map(position_from).transpose()?.unwrap_or(start_pos);
            MovementPattern::Fixed(FixedPattern::new(pos))
        }
        "waypoints" => {
            let points = required(&options, "points")?.as_array().ok_or_else(|| ConfigError::Missing("movement.options.points".to_string()))?;
            let waypoints = points.iter().map(position_from).collect::<ConfigResult<Vec<_>>>()?;
            let start_index = opt_u64(&options, "start_index", 0) as usize;
            let forward = opt_bool(&options, "forward", true);
            let repeat = opt_bool(&options, "repeat", false);
            let bounce = opt_bool(&options, "bounce", false);
            MovementPattern::Waypoints(WaypointsPattern::new(waypoints, start_index, forward, repeat, bounce))
        }
        "circle" => {
            let center = position_from(required(&options, "center")?)?;
            let radius = required(&options, "radius")?.as_f64().ok_or_else(|| ConfigError::Missing("movement.options.radius".to_string()))? as f32;
            let repeat = opt_bool(&options, "repeat", true);
            circle_pattern(center, radius, speed, repeat)
        }
        "spiral" => {
            let center = position_from(required(&options, "center")?)?;
            let growth = required(&options, "growth")?.as_f64().ok_or_else(|| ConfigError::Missing("movement.options.growth".to_string()))? as f32;
            spiral_pattern(center, growth, speed)
        }
        "spline" => {
            let points = required(&options, "control_points")?.as_array().ok_or_else(|| ConfigError::Missing("movement.options.control_points".to_string()))?;
            let control_points = points.iter().map(position_from).collect::<ConfigResult<Vec<_>>>()?;
            let repeat = opt_bool(&options, "repeat", false);
            spline_pattern(&control_points, speed, repeat)
        }
        "arc" => {
            let start = position_from(required(&options, "start")?)?;
            let through = position_from(required(&options, "through")?)?;
            let end = position_from(required(&options, "end")?)?;
            let repeat = opt_bool(&options, "repeat", false);
            arc_pattern(start, through, end, speed, repeat)
        }
        other => return Err(ConfigError::Missing(format!("movement.pattern: unrecognized {other}"))),
    };

    Ok(Movement::new(pattern, speed, model_speed_limit))
}

fn build_radio(entry: &Value) -> Radio {
    let params = entry.get("radio").map(|radio| RadioParams {
        detection_thresh: opt_f32(radio, "detection_thresh", RadioParams::default().detection_thresh),
        connection_thresh: opt_f32(radio, "connection_thresh", RadioParams::default().connection_thresh),
    });
    Radio::new(params.unwrap_or_default())
}

fn build_contact_plan(entry: &Value) -> ConfigResult<ContactPlan> {
    let Some(cp_file) = entry.get("cp_file").and_then(Value::as_str) else {
        return Ok(ContactPlan::new());
    };
    let path = Path::new(cp_file);
    let contacts = if path.extension().and_then(|e| e.to_str()) == Some("csv") {
        dtn_contact::load_contacts_csv(path)?
    } else {
        dtn_contact::load_contacts_json(path)?
    };

    let mut plan = ContactPlan::new();
    for c in contacts {
        plan.add_contact(c.src, c.dst, c.start_ts, c.end_ts, c.rate, c.owlt, c.confidence);
    }
    Ok(plan)
}

fn routing_protocol_for(kind: RoutingProtocolKind, contact_plan: ContactPlan) -> Box<dyn RoutingProtocol + Send> {
    match kind {
        RoutingProtocolKind::Cgr => Box::new(Cgr::new(contact_plan)),
        RoutingProtocolKind::Epidemic => Box::new(Epidemic::new()),
        RoutingProtocolKind::Spray => Box::new(SprayAndWait::new()),
    }
}

fn chase_target_of(entry: &Value) -> Option<AgentId> {
    let behavior = entry.get("special_behavior")?;
    if behavior.get("type").and_then(Value::as_str) != Some("rssi_find_target") {
        return None;
    }
    behavior
        .get("options")
        .and_then(|o| o.get("target"))
        .and_then(Value::as_str)
        .map(AgentId::new)
}

fn build_agent(entry: &Value, model: &ModelConfig, next_id: &mut u64) -> ConfigResult<Agent> {
    let kind = required(entry, "type")?.as_str().ok_or_else(|| ConfigError::Missing("type".to_string()))?;

    let id = match entry.get("id").and_then(Value::as_str) {
        Some(id) => AgentId::new(id),
        None => {
            let id = AgentId::new(format!("agent-{next_id}"));
            *next_id += 1;
            id
        }
    };
    let pos = entry.get("pos").map(position_from).transpose()?.unwrap_or(Position::new(0.0, 0.0));
    let movement = build_movement(entry, pos, model.model_speed_limit)?;
    let radio = build_radio(entry);
    let peripherals = Peripherals::new(movement, radio);

    Ok(match kind {
        "router" => Agent::Router(RouterAgent {
            id: id.clone(),
            peripherals,
            routing: routing_protocol_for(model.routing_protocol, build_contact_plan(entry)?),
            handshake: RouterHandshake::new(id, model.host_router_mapping_timeout),
        }),
        "client" => Agent::Client(ClientAgent {
            id: id.clone(),
            peripherals,
            handshake: ClientHandshake::new(id),
            state: ClientState::new(),
        }),
        "epidemic" => Agent::Epidemic(FlatAgent {
            id,
            peripherals,
            routing: Box::new(Epidemic::new()),
            ground: GroundPayloadHandler::new(),
        }),
        "spray" => Agent::Spray(FlatAgent {
            id,
            peripherals,
            routing: Box::new(SprayAndWait::new()),
            ground: GroundPayloadHandler::new(),
        }),
        "simple" => Agent::Simple(SimpleAgent {
            id,
            peripherals,
            chase_target: chase_target_of(entry),
        }),
        other => return Err(ConfigError::UnknownAgentType(other.to_string())),
    })
}

/// Build a ready-to-run `Sim` from loaded, merged model and agent
/// documents.
pub fn build_sim(model: &ModelConfig, agent_entries: &[Value], capture_contacts: bool, correctness_override: Option<bool>) -> ConfigResult<Sim> {
    let mut agents_store = dtn_agent::AgentStore::new();
    let mut next_id = 0u64;
    for entry in agent_entries {
        let agent = build_agent(entry, model, &mut next_id)?;
        agents_store.insert(agent)?;
    }

    let drops = DropSchedule::new(model.data_drop_schedule.clone());
    let rssi_source = build_rssi_source(&model.rssi_source, model.rssi_noise_stdev, model.enable_walls)?;

    Ok(Sim::new(
        SimConfig {
            total_ticks: model.max_steps,
            seed: model.seed,
        },
        model.bounds,
        agents_store,
        rssi_source,
        model.bundle_lifespan,
        model.payload_lifespan,
        drops,
        capture_contacts || model.make_contact_plan,
        correctness_override.unwrap_or(model.correctness),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn per_agent_value_wins_over_default() {
        let defaults = json!({"radio": {"detection_thresh": -90.0}, "type": "simple"});
        let agent = json!({"radio": {"detection_thresh": -50.0}, "id": "a0"});
        let merged = merge_defaults(&defaults, &agent);
        assert_eq!(merged["radio"]["detection_thresh"], -50.0);
        assert_eq!(merged["type"], "simple");
        assert_eq!(merged["id"], "a0");
    }

    #[test]
    fn missing_required_model_key_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"size": [100, 100]}"#).unwrap();
        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(key) if key == "max_steps"));
    }

    #[test]
    fn unknown_agent_type_is_reported() {
        let model = ModelConfig {
            title: "t".into(),
            scenario_name: "s".into(),
            max_steps: 10,
            seed: 1,
            bounds: Bounds::new(100.0, 100.0),
            rssi_noise_stdev: 0.0,
            model_speed_limit: f32::MAX,
            enable_walls: true,
            host_router_mapping_timeout: 100,
            payload_lifespan: 100,
            bundle_lifespan: 100,
            routing_protocol: RoutingProtocolKind::Cgr,
            rssi_source: Value::String("path_loss".to_string()),
            data_drop_schedule: vec![],
            log_metrics: false,
            correctness: false,
            make_contact_plan: false,
        };
        let entries = vec![json!({"type": "blimp", "id": "x"})];
        let err = build_sim(&model, &entries, false, None).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAgentType(t) if t == "blimp"));
    }
}
