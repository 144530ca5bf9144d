//! Job-end output: ntuples as Parquet, histograms as JSON.
//!
//! Ntuple schema, one row per candidate:
//!
//! | Columns                                   | Type                       | Nullable |
//! |-------------------------------------------|----------------------------|----------|
//! | `run`, `lumi`                             | `Int32`                    | no       |
//! | `event`                                   | `Int64`                    | no       |
//! | kinematics, isolation, ID, vertex, E/p    | `Float32`                  | no       |
//! | charges, `ele_cr_mhitsinner`, dataset tag | `Int32`                    | no       |
//! | `ele_ctf_charge`                          | `Int32`                    | yes      |
//! | conversion, primary vertex, PF/TC MET     | `Float32`                  | yes      |
//! | `calojet_*`, `pfjet_*` (jets enabled)     | `FixedSizeList<Float32,5>` | yes      |

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, FixedSizeListBuilder, Float32Array, Float32Builder, Int32Array, Int64Array,
};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;

use crate::book::HistogramBook;
use crate::histogram::Histogram1D;
use crate::jets::JET_SLOTS;
use crate::ntuple::{NtupleRow, NtupleTable};
use crate::plotter::PlotResults;

/// Error type for writing (and reading back) job output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Parquet encoding or decoding failed
    #[error("Parquet read/write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Record batch construction failed
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// File system error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Histogram serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Default)]
struct Columns {
    fields: Vec<Field>,
    arrays: Vec<ArrayRef>,
}

impl Columns {
    fn push(&mut self, name: &str, array: ArrayRef) {
        let nullable = array.null_count() > 0 || name_is_optional(name);
        self.fields.push(Field::new(name, array.data_type().clone(), nullable));
        self.arrays.push(array);
    }

    fn f32(&mut self, name: &str, rows: &[NtupleRow], f: impl Fn(&NtupleRow) -> f32) {
        self.push(name, Arc::new(Float32Array::from_iter_values(rows.iter().map(f))));
    }

    fn opt_f32(&mut self, name: &str, rows: &[NtupleRow], f: impl Fn(&NtupleRow) -> Option<f32>) {
        self.push(name, Arc::new(rows.iter().map(f).collect::<Float32Array>()));
    }

    fn i32(&mut self, name: &str, rows: &[NtupleRow], f: impl Fn(&NtupleRow) -> i32) {
        self.push(name, Arc::new(Int32Array::from_iter_values(rows.iter().map(f))));
    }

    fn jets(
        &mut self,
        name: &str,
        rows: &[NtupleRow],
        f: impl Fn(&NtupleRow) -> Option<[f32; JET_SLOTS]>,
    ) {
        let mut b = FixedSizeListBuilder::new(Float32Builder::new(), JET_SLOTS as i32);
        for row in rows {
            match f(row) {
                Some(values) => {
                    b.values().append_slice(&values);
                    b.append(true);
                }
                None => {
                    b.values().append_nulls(JET_SLOTS);
                    b.append(false);
                }
            }
        }
        self.push(name, Arc::new(b.finish()));
    }
}

const OPTIONAL_COLUMNS: &[&str] = &[
    "ele_cr_dcot",
    "ele_cr_dist",
    "pv_x",
    "pv_y",
    "pv_z",
    "ele_ctf_charge",
    "ele_tip_pv",
    "event_pf_met",
    "event_pf_met_phi",
    "event_pf_mt",
    "event_tc_met",
    "event_tc_met_phi",
    "event_tc_mt",
    "calojet_et",
    "calojet_eta",
    "calojet_phi",
    "pfjet_et",
    "pfjet_eta",
    "pfjet_phi",
];

fn name_is_optional(name: &str) -> bool {
    OPTIONAL_COLUMNS.contains(&name)
}

/// Convert an ntuple table into one Arrow record batch.
pub fn ntuple_to_record_batch(table: &NtupleTable) -> Result<RecordBatch, ExportError> {
    let rows = table.rows.as_slice();
    let mut c = Columns::default();

    c.i32("run", rows, |r| r.run);
    c.i32("lumi", rows, |r| r.lumi);
    c.push("event", Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.event))));

    c.f32("ele_sc_gsf_et", rows, |r| r.ele_sc_gsf_et);
    c.f32("ele_sc_energy", rows, |r| r.ele_sc_energy);
    c.f32("ele_sc_eta", rows, |r| r.ele_sc_eta);
    c.f32("ele_sc_phi", rows, |r| r.ele_sc_phi);
    c.f32("ele_cand_et", rows, |r| r.ele_cand_et);
    c.f32("ele_cand_eta", rows, |r| r.ele_cand_eta);
    c.f32("ele_cand_phi", rows, |r| r.ele_cand_phi);

    c.f32("ele_iso_track", rows, |r| r.ele_iso_track);
    c.f32("ele_iso_ecal", rows, |r| r.ele_iso_ecal);
    c.f32("ele_iso_hcal", rows, |r| r.ele_iso_hcal);

    c.f32("ele_id_sihih", rows, |r| r.ele_id_sihih);
    c.f32("ele_id_deta", rows, |r| r.ele_id_deta);
    c.f32("ele_id_dphi", rows, |r| r.ele_id_dphi);
    c.f32("ele_id_hoe", rows, |r| r.ele_id_hoe);

    c.i32("ele_cr_mhitsinner", rows, |r| r.ele_cr_mhitsinner);
    c.opt_f32("ele_cr_dcot", rows, |r| r.ele_cr_dcot);
    c.opt_f32("ele_cr_dist", rows, |r| r.ele_cr_dist);

    c.f32("ele_vx", rows, |r| r.ele_vx);
    c.f32("ele_vy", rows, |r| r.ele_vy);
    c.f32("ele_vz", rows, |r| r.ele_vz);
    c.opt_f32("pv_x", rows, |r| r.pv_x);
    c.opt_f32("pv_y", rows, |r| r.pv_y);
    c.opt_f32("pv_z", rows, |r| r.pv_z);

    c.i32("ele_gsf_charge", rows, |r| r.ele_gsf_charge);
    c.push(
        "ele_ctf_charge",
        Arc::new(rows.iter().map(|r| r.ele_ctf_charge).collect::<Int32Array>()),
    );
    c.i32("ele_sc_pix_charge", rows, |r| r.ele_sc_pix_charge);

    c.f32("ele_eop", rows, |r| r.ele_eop);
    c.f32("ele_tip_bs", rows, |r| r.ele_tip_bs);
    c.opt_f32("ele_tip_pv", rows, |r| r.ele_tip_pv);

    c.f32("event_calo_met", rows, |r| r.event_calo_met);
    c.f32("event_calo_met_phi", rows, |r| r.event_calo_met_phi);
    c.f32("event_calo_mt", rows, |r| r.event_calo_mt);
    c.opt_f32("event_pf_met", rows, |r| r.event_pf_met);
    c.opt_f32("event_pf_met_phi", rows, |r| r.event_pf_met_phi);
    c.opt_f32("event_pf_mt", rows, |r| r.event_pf_mt);
    c.opt_f32("event_tc_met", rows, |r| r.event_tc_met);
    c.opt_f32("event_tc_met_phi", rows, |r| r.event_tc_met_phi);
    c.opt_f32("event_tc_mt", rows, |r| r.event_tc_mt);

    c.i32("event_dataset_tag", rows, |r| r.event_dataset_tag);

    if table.include_jets {
        c.jets("calojet_et", rows, |r| r.calo_jets.map(|s| s.et));
        c.jets("calojet_eta", rows, |r| r.calo_jets.map(|s| s.eta));
        c.jets("calojet_phi", rows, |r| r.calo_jets.map(|s| s.phi));
        c.jets("pfjet_et", rows, |r| r.pf_jets.map(|s| s.et));
        c.jets("pfjet_eta", rows, |r| r.pf_jets.map(|s| s.eta));
        c.jets("pfjet_phi", rows, |r| r.pf_jets.map(|s| s.phi));
    }

    let schema = Arc::new(Schema::new(c.fields));
    Ok(RecordBatch::try_new(schema, c.arrays)?)
}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder().set_compression(Compression::SNAPPY).build()
}

/// Write an ntuple table to a Parquet file (Snappy). Empty tables keep their schema.
pub fn write_ntuple_parquet(path: &Path, table: &NtupleTable) -> Result<(), ExportError> {
    let batch = ntuple_to_record_batch(table)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(writer_properties()))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Read a Parquet file into Arrow record batches.
pub fn read_parquet_batches(path: &Path) -> Result<Vec<RecordBatch>, ExportError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;
    let batches: Result<Vec<_>, _> = reader.collect();
    Ok(batches?)
}

#[derive(Serialize)]
struct HistogramDocument<'a> {
    histograms: Vec<HistogramJson<'a>>,
}

#[derive(Serialize)]
struct HistogramJson<'a> {
    #[serde(flatten)]
    histogram: &'a Histogram1D,
    bin_edges: Vec<f64>,
}

/// Write every booked histogram to a JSON document.
pub fn write_histograms_json(path: &Path, book: &HistogramBook) -> Result<(), ExportError> {
    let doc = HistogramDocument {
        histograms: book
            .histograms()
            .iter()
            .map(|h| HistogramJson { histogram: h, bin_edges: h.bin_edges() })
            .collect(),
    };
    let w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(w, &doc)?;
    Ok(())
}

/// Paths written by [`write_results`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFiles {
    /// Selected-candidate ntuple
    pub selection: PathBuf,
    /// All-candidate ntuple
    pub preselection: PathBuf,
    /// Histogram document
    pub histograms: PathBuf,
}

/// Write both ntuples and the histograms into `dir`.
pub fn write_results(dir: &Path, results: &PlotResults) -> Result<OutputFiles, ExportError> {
    std::fs::create_dir_all(dir)?;
    let files = OutputFiles {
        selection: dir.join(format!("{}.parquet", results.selection.name)),
        preselection: dir.join(format!("{}.parquet", results.preselection.name)),
        histograms: dir.join("histograms.json"),
    };
    write_ntuple_parquet(&files.selection, &results.selection)?;
    write_ntuple_parquet(&files.preselection, &results.preselection)?;
    write_histograms_json(&files.histograms, &results.histograms)?;
    log::info!(
        "wenu plots: wrote {} selected / {} preselected rows to {}",
        results.selection.len(),
        results.preselection.len(),
        dir.display()
    );
    Ok(files)
}
