//! Parameter inspection for diagnostics

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::debug;
use yolo_common::{FormatDescriptor, ParameterKind, StoreConfig};
use yolo_weights::{KernelShape, OrientedWeights, WeightsAccessor};

/// Inspect command arguments
#[derive(Args)]
pub struct InspectCommand {
    /// Resource name, relative to the namespace
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Parameter kind (kernel, bias, gamma, beta, moving-mean, moving-variance)
    #[arg(long, default_value = "kernel")]
    pub kind: ParameterKind,

    /// Kernel width
    #[arg(long, default_value_t = 1)]
    pub width: usize,

    /// Kernel height
    #[arg(long, default_value_t = 1)]
    pub height: usize,

    /// Kernel input depth
    #[arg(long)]
    pub input_depth: Option<usize>,

    /// Output depth (number of output channels)
    #[arg(long)]
    pub output_depth: usize,

    /// Output format as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    name: String,
    kind: ParameterKind,
    address: String,
    rows: usize,
    cols: usize,
    format: FormatDescriptor,
    stats: Option<Stats>,
}

#[derive(Debug, Serialize, PartialEq)]
struct Stats {
    min: f32,
    max: f32,
    mean: f64,
}

impl Stats {
    fn of(values: &[f32]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let (min, max, sum) = values.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
            |(lo, hi, sum), &v| (lo.min(v), hi.max(v), sum + v as f64),
        );
        Some(Self { min, max, mean: sum / values.len() as f64 })
    }
}

impl InspectCommand {
    pub fn execute(&self, config: &StoreConfig) -> Result<()> {
        let accessor =
            WeightsAccessor::from_config(config).context("Failed to open weights store")?;
        let address = accessor.store().address(&self.name);

        let weights = self
            .load(&accessor)
            .with_context(|| format!("Failed to load {} {}", self.kind, self.name))?;
        let report = self.report(address, &weights)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }

    fn load<S: yolo_weights::ByteSource>(
        &self,
        accessor: &WeightsAccessor<S>,
    ) -> yolo_weights::Result<OrientedWeights> {
        match self.kind {
            ParameterKind::ConvolutionKernel => {
                let Some(input_depth) = self.input_depth else {
                    return Err(yolo_weights::WeightsError::InvalidDimensions(
                        "--input-depth is required for kernels".into(),
                    ));
                };
                let shape = KernelShape::new(self.width, self.height, input_depth, self.output_depth);
                debug!("Inspecting kernel {} with shape {}", self.name, shape);
                accessor.kernel(&self.name, shape)
            }
            kind => accessor.vector(&self.name, kind, self.output_depth),
        }
    }

    fn report(&self, address: String, weights: &OrientedWeights) -> Result<InspectReport> {
        let matrix = weights.matrix.to_row_major()?;
        Ok(InspectReport {
            name: self.name.clone(),
            kind: weights.kind,
            address,
            rows: matrix.rows(),
            cols: matrix.cols(),
            format: weights.format.clone(),
            stats: Stats::of(matrix.as_slice()),
        })
    }
}

fn print_report(report: &InspectReport) {
    println!("Name:     {}", report.name);
    println!("Kind:     {}", report.kind);
    println!("Address:  {}", report.address);
    println!("Shape:    {} x {}", report.rows, report.cols);
    println!("Rows:     {:?}", report.format.row_dimensions());
    println!("Columns:  {:?}", report.format.column_dimensions());
    if let Some(stats) = &report.stats {
        println!("Min:      {}", stats.min);
        println!("Max:      {}", stats.max);
        println!("Mean:     {:.6}", stats.mean);
    }
}
