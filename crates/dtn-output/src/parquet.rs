//! Parquet output backend (feature `parquet`).
//!
//! Creates two files in the configured output directory:
//! - `agent_snapshots.parquet`
//! - `tick_summaries.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float32Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputResult;

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("agent_id", DataType::Utf8, false),
        Field::new("tick", DataType::UInt64, false),
        Field::new("kind", DataType::Utf8, false),
        Field::new("x", DataType::Float32, false),
        Field::new("y", DataType::Float32, false),
        Field::new("connected_neighbor_count", DataType::UInt32, false),
        Field::new("num_stored_bundles", DataType::UInt64, false),
        Field::new("num_payloads_received", DataType::UInt64, false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick", DataType::UInt64, false),
        Field::new("total_bundles_stored_cumulative", DataType::UInt64, false),
        Field::new("num_drops_picked_up", DataType::UInt64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder().set_compression(Compression::SNAPPY).build()
}

/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    snapshots: Option<ArrowWriter<File>>,
    summaries: Option<ArrowWriter<File>>,
    snap_schema: Arc<Schema>,
    summ_schema: Arc<Schema>,
}

impl ParquetWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let snap_schema = snapshot_schema();
        let summ_schema = summary_schema();

        let snap_file = File::create(dir.join("agent_snapshots.parquet"))?;
        let snapshots = ArrowWriter::try_new(snap_file, Arc::clone(&snap_schema), Some(snappy_props()))?;

        let summ_file = File::create(dir.join("tick_summaries.parquet"))?;
        let summaries = ArrowWriter::try_new(summ_file, Arc::clone(&summ_schema), Some(snappy_props()))?;

        Ok(Self {
            snapshots: Some(snapshots),
            summaries: Some(summaries),
            snap_schema,
            summ_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.snapshots.as_mut() else {
            return Ok(());
        };

        let mut agent_ids = StringBuilder::new();
        let mut ticks = UInt64Builder::new();
        let mut kinds = StringBuilder::new();
        let mut xs = Float32Builder::new();
        let mut ys = Float32Builder::new();
        let mut connected = UInt32Builder::new();
        let mut stored = UInt64Builder::new();
        let mut received = UInt64Builder::new();

        for row in rows {
            agent_ids.append_value(&row.agent_id);
            ticks.append_value(row.tick);
            kinds.append_value(row.kind);
            xs.append_value(row.x);
            ys.append_value(row.y);
            connected.append_value(row.connected_neighbor_count);
            stored.append_value(row.num_stored_bundles);
            received.append_value(row.num_payloads_received);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.snap_schema),
            vec![
                Arc::new(agent_ids.finish()),
                Arc::new(ticks.finish()),
                Arc::new(kinds.finish()),
                Arc::new(xs.finish()),
                Arc::new(ys.finish()),
                Arc::new(connected.finish()),
                Arc::new(stored.finish()),
                Arc::new(received.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut ticks = UInt64Builder::new();
        let mut stored = UInt64Builder::new();
        let mut drops = UInt64Builder::new();

        ticks.append_value(row.tick);
        stored.append_value(row.total_bundles_stored_cumulative);
        drops.append_value(row.num_drops_picked_up);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.summ_schema),
            vec![Arc::new(ticks.finish()), Arc::new(stored.finish()), Arc::new(drops.finish())],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.snapshots.take() {
            w.close()?;
        }
        if let Some(w) = self.summaries.take() {
            w.close()?;
        }
        Ok(())
    }
}
