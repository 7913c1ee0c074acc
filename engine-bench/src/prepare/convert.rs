//! Pipe-delimited mortgage text files to Parquet

use datafusion::arrow::array::{ArrayRef, Scalar, StringArray};
use datafusion::arrow::compute::kernels::cast::{cast_with_options, CastOptions};
use datafusion::arrow::compute::kernels::cmp::eq;
use datafusion::arrow::compute::kernels::nullif::nullif;
use datafusion::arrow::csv::ReaderBuilder;
use datafusion::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::parquet::arrow::ArrowWriter;
use regex::Regex;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::error::Result;

static PERFORMANCE_COLUMNS: [(&str, DataType); 30] = [
    ("monthly_reporting_period", DataType::Utf8),
    ("servicer", DataType::Utf8),
    ("interest_rate", DataType::Float64),
    ("current_actual_upb", DataType::Float64),
    ("loan_age", DataType::Float64),
    ("remaining_months_to_legal_maturity", DataType::Float64),
    ("adj_remaining_months_to_maturity", DataType::Float64),
    ("maturity_date", DataType::Utf8),
    ("msa", DataType::Float64),
    ("current_loan_delinquency_status", DataType::Float64),
    ("mod_flag", DataType::Utf8),
    ("zero_balance_code", DataType::Utf8),
    ("zero_balance_effective_date", DataType::Utf8),
    ("last_paid_installment_date", DataType::Utf8),
    ("foreclosed_after", DataType::Utf8),
    ("disposition_date", DataType::Utf8),
    ("foreclosure_costs", DataType::Float64),
    ("prop_preservation_and_reair_costs", DataType::Float64),
    ("asset_recovery_costs", DataType::Float64),
    ("misc_holding_expenses", DataType::Float64),
    ("holding_taxes", DataType::Float64),
    ("net_sale_proceeds", DataType::Float64),
    ("credit_enhancement_proceeds", DataType::Float64),
    ("repurchase_make_whole_proceeds", DataType::Float64),
    ("other_foreclosure_proceeds", DataType::Float64),
    ("non_interest_bearing_upb", DataType::Float64),
    ("principal_forgiveness_upb", DataType::Utf8),
    ("repurchase_make_whole_proceeds_flag", DataType::Utf8),
    ("foreclosure_principal_write_off_amount", DataType::Utf8),
    ("servicing_activity_indicator", DataType::Utf8),
];

static ACQUISITION_COLUMNS: [(&str, DataType); 25] = [
    ("orig_channel", DataType::Utf8),
    ("seller_name", DataType::Utf8),
    ("orig_interest_rate", DataType::Float64),
    ("orig_upb", DataType::Float64),
    ("orig_loan_term", DataType::Float64),
    ("orig_date", DataType::Utf8),
    ("first_pay_date", DataType::Utf8),
    ("orig_ltv", DataType::Float64),
    ("orig_cltv", DataType::Float64),
    ("num_borrowers", DataType::Float64),
    ("dti", DataType::Float64),
    ("borrower_credit_score", DataType::Float64),
    ("first_home_buyer", DataType::Utf8),
    ("loan_purpose", DataType::Utf8),
    ("property_type", DataType::Utf8),
    ("num_units", DataType::Float64),
    ("occupancy_status", DataType::Utf8),
    ("property_state", DataType::Utf8),
    ("zip", DataType::Float64),
    ("mortgage_insurance_percent", DataType::Float64),
    ("product_type", DataType::Utf8),
    ("coborrow_credit_score", DataType::Float64),
    ("mortgage_insurance_type", DataType::Float64),
    ("relocation_mortgage_indicator", DataType::Utf8),
    ("dummy", DataType::Utf8),
];

/// The two kinds of file in the mortgage archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Performance,
    Acquisition,
}

impl Dataset {
    /// Subdirectory of the data directory holding this dataset
    pub fn dir_name(&self) -> &'static str {
        match self {
            Dataset::Performance => "perf",
            Dataset::Acquisition => "acq",
        }
    }

    /// `loan_id` followed by the dataset's columns; every field is nullable
    pub fn schema(&self, id_as_float64: bool) -> SchemaRef {
        let id_type = if id_as_float64 {
            DataType::Float64
        } else {
            DataType::Int64
        };
        let columns: &[(&str, DataType)] = match self {
            Dataset::Performance => &PERFORMANCE_COLUMNS,
            Dataset::Acquisition => &ACQUISITION_COLUMNS,
        };

        let fields: Vec<Field> = std::iter::once(Field::new("loan_id", id_type, true))
            .chain(
                columns
                    .iter()
                    .map(|(name, data_type)| Field::new(*name, data_type.clone(), true)),
            )
            .collect();
        Arc::new(Schema::new(fields))
    }
}

/// Text files in `dir` still waiting for conversion
pub fn input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_some_and(|ext| ext == "parquet") {
            continue;
        }
        let is_text = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.contains(".txt"));
        if is_text {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Same field names as `schema`, every one read as text
fn text_schema(schema: &Schema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| Field::new(field.name(), DataType::Utf8, true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Cast a text batch to `schema`. Empty fields stay `""` in text columns
/// and become null in numeric ones.
fn typed_batch(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let empty = Scalar::new(StringArray::from(vec![""]));
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());
    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        if field.data_type() == &DataType::Utf8 {
            columns.push(column.clone());
            continue;
        }
        let blank = eq(column, &empty)?;
        let column = nullif(column.as_ref(), &blank)?;
        columns.push(cast_with_options(&column, field.data_type(), &options)?);
    }
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}

/// Convert one file, writing `<file name>.parquet` next to it
pub fn convert_file(input: &Path, schema: SchemaRef) -> Result<PathBuf> {
    let mut name = input.file_name().unwrap_or_default().to_os_string();
    name.push(".parquet");
    let output = input.with_file_name(name);

    // Nothing matches, so only fields missing from a truncated row are null
    let no_nulls = Regex::new(r"[^\s\S]")?;
    let reader = ReaderBuilder::new(text_schema(&schema))
        .with_header(false)
        .with_delimiter(b'|')
        .with_truncated_rows(true)
        .with_null_regex(no_nulls)
        .build(File::open(input)?)?;

    let mut writer = ArrowWriter::try_new(File::create(&output)?, schema.clone(), None)?;
    for batch in reader {
        writer.write(&typed_batch(&batch?, &schema)?)?;
    }
    writer.close()?;

    log::debug!("Converted {} to {}", input.display(), output.display());
    Ok(output)
}

/// Convert every text file of `dataset` under `datadir` in parallel
pub async fn convert_dataset(
    datadir: &Path,
    dataset: Dataset,
    id_as_float64: bool,
) -> Result<Vec<PathBuf>> {
    let dir = datadir.join(dataset.dir_name());
    let schema = dataset.schema(id_as_float64);

    let mut tasks = JoinSet::new();
    for input in input_files(&dir)? {
        let schema = schema.clone();
        tasks.spawn_blocking(move || convert_file(&input, schema));
    }

    let mut written = Vec::with_capacity(tasks.len());
    while let Some(result) = tasks.join_next().await {
        written.push(result??);
    }
    written.sort();
    Ok(written)
}
