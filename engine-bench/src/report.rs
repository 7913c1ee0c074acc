//! JSON and CSV output of benchmark results

use datafusion::arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, UInt64Array};
use datafusion::arrow::csv::WriterBuilder;
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use datafusion::arrow::record_batch::RecordBatch;
use std::io::Write;
use std::sync::Arc;

use crate::error::Result;
use crate::runner::{RunGroup, RunRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

pub fn write<W: Write>(groups: &[RunGroup], format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(groups, writer),
        OutputFormat::Json => write_json(groups, writer),
    }
}

/// Nested groups, platform info included
pub fn write_json<W: Write>(groups: &[RunGroup], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, groups)?;
    writeln!(writer)?;
    Ok(())
}

/// One row per run with `datadir` and `db` as the trailing columns
pub fn write_csv<W: Write>(groups: &[RunGroup], writer: W) -> Result<()> {
    let batch = to_record_batch(groups)?;
    let mut writer = WriterBuilder::new().with_header(true).build(writer);
    writer.write(&batch)?;
    Ok(())
}

fn json_list(values: &Option<Vec<f64>>) -> Result<Option<String>> {
    values
        .as_ref()
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(Into::into)
}

/// Flatten run groups into a single batch
pub fn to_record_batch(groups: &[RunGroup]) -> Result<RecordBatch> {
    let rows: Vec<(&RunGroup, &RunRecord)> = groups
        .iter()
        .flat_map(|group| group.runs.iter().map(move |run| (group, run)))
        .collect();
    let with_power = rows.iter().any(|(_, run)| !run.power.is_empty());

    let mut fields = vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("threads", DataType::UInt64, false),
        Field::new("run_date", DataType::Utf8, false),
        Field::new("total_time_process", DataType::Float64, false),
        Field::new("total_time_cpu", DataType::Float64, false),
        Field::new("max_memory_usage", DataType::Float64, false),
        Field::new("rows", DataType::UInt64, true),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|(_, r)| r.name.as_str()))),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|(_, r)| r.threads as u64))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|(_, r)| r.run_date.as_str()))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|(_, r)| r.total_time_process))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|(_, r)| r.total_time_cpu))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|(_, r)| r.max_memory_usage))),
        Arc::new(UInt64Array::from(
            rows.iter().map(|(_, r)| r.rows.map(|n| n as u64)).collect::<Vec<_>>(),
        )),
    ];

    if with_power {
        let idle = rows
            .iter()
            .map(|(_, r)| json_list(&r.power.idle_ratio_cpus))
            .collect::<Result<Vec<_>>>()?;
        let freq = rows
            .iter()
            .map(|(_, r)| json_list(&r.power.freq_hz))
            .collect::<Result<Vec<_>>>()?;

        fields.extend([
            Field::new("idle_ratio_cpus", DataType::Utf8, true),
            Field::new("freq_hz", DataType::Utf8, true),
            Field::new("power_mW", DataType::Float64, true),
            Field::new("package_energy_sum", DataType::Int64, true),
            Field::new("cpu_mJ", DataType::Float64, true),
            Field::new("dram_energy_sum", DataType::Int64, true),
            Field::new("elapsed_ns", DataType::Int64, true),
        ]);
        columns.extend([
            Arc::new(StringArray::from(idle)) as ArrayRef,
            Arc::new(StringArray::from(freq)),
            Arc::new(Float64Array::from(
                rows.iter().map(|(_, r)| r.power.power_mw).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|(_, r)| r.power.package_energy_sum).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|(_, r)| r.power.cpu_mj).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|(_, r)| r.power.dram_energy_sum).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|(_, r)| r.power.elapsed_ns).collect::<Vec<_>>(),
            )),
        ]);
    }

    fields.extend([
        Field::new("error", DataType::Utf8, true),
        Field::new("datadir", DataType::Utf8, false),
        Field::new("db", DataType::Utf8, false),
    ]);
    columns.extend([
        Arc::new(StringArray::from(
            rows.iter().map(|(_, r)| r.error.clone()).collect::<Vec<_>>(),
        )) as ArrayRef,
        Arc::new(StringArray::from_iter_values(rows.iter().map(|(g, _)| g.datadir.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|(g, _)| g.db.as_str()))),
    ]);

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
