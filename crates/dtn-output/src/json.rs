//! The canonical state-snapshot writer (spec.md §6): one JSON line per
//! tick, each holding every agent's `{id, pos, name?, radio, history,
//! routing_protocol?, type, counters}` map. Newline-delimited rather than
//! one file per tick or a single growing JSON array, so a run can be
//! tailed while in progress and a crash mid-run still leaves every
//! already-written tick readable.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use dtn_core::Tick;

use crate::row::AgentSnapshot;
use crate::OutputResult;

#[derive(serde::Serialize)]
struct SnapshotLine<'a> {
    tick: u64,
    agents: &'a [AgentSnapshot],
}

pub struct JsonSnapshotWriter {
    file: BufWriter<File>,
}

impl JsonSnapshotWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let file = File::create(dir.join("snapshots.jsonl"))?;
        Ok(Self { file: BufWriter::new(file) })
    }

    pub fn write_snapshot(&mut self, tick: Tick, agents: &[AgentSnapshot]) -> OutputResult<()> {
        let line = SnapshotLine { tick: tick.0, agents };
        serde_json::to_writer(&mut self.file, &line)?;
        self.file.write_all(b"\n")?;
        Ok(())
    }

    pub fn finish(&mut self) -> OutputResult<()> {
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtn_agent::{Agent, Peripherals, SimpleAgent};
    use dtn_core::{AgentId, Position, Radio, RadioParams};
    use dtn_mobility::{FixedPattern, Movement, MovementPattern};

    #[test]
    fn writes_one_line_per_tick() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = JsonSnapshotWriter::new(dir.path()).unwrap();

        let agent = Agent::Simple(SimpleAgent {
            id: AgentId::new("s0"),
            peripherals: Peripherals::new(
                Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(1.0, 2.0))), 1.0, f32::MAX),
                Radio::new(RadioParams::default()),
            ),
            chase_target: None,
        });
        let snapshot = crate::row::build_snapshot(&agent);

        writer.write_snapshot(Tick(0), &[snapshot.clone()]).unwrap();
        writer.write_snapshot(Tick(1), &[snapshot]).unwrap();
        writer.finish().unwrap();

        let contents = std::fs::read_to_string(dir.path().join("snapshots.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(first["tick"], 0);
        assert_eq!(first["agents"][0]["id"], "s0");
        assert_eq!(first["agents"][0]["type"], "simple");
    }
}
