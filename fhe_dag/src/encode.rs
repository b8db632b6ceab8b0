//! Vector encodings for the query pipeline.
//!
//! Comparison predicates and payload reductions operate on block-structured
//! slot layouts: record `j` owns slots `j*QUERY_BLOCK .. (j+1)*QUERY_BLOCK`.
//! The comparable encoding replicates each record's value across its block
//! so slotwise comparison yields a full-block 0/1 mask; the frequency-domain
//! encoding spreads each payload value over a cosine/sine carrier so the
//! reduced first block can be projected back to the masked sum.

use std::f64::consts::TAU;

use log::debug;

use crate::QUERY_BLOCK;
use crate::dag::Dag;
use crate::error::DecryptError;

fn carrier(slot: usize) -> (f64, f64) {
    let angle = TAU * slot as f64 / QUERY_BLOCK as f64;
    (angle.cos(), angle.sin())
}

/// Encode record values for slotwise comparison: each value fills its
/// record's block.
pub fn encode_comparable(values: &[i64], label: &str) -> Vec<f64> {
    let mut slots = vec![0.0; values.len() * QUERY_BLOCK];
    for (record, &value) in values.iter().enumerate() {
        for slot in &mut slots[record * QUERY_BLOCK..(record + 1) * QUERY_BLOCK] {
            *slot = value as f64;
        }
    }
    debug!(
        "Encoded {} records ({} slots) for comparable input '{label}'",
        values.len(),
        slots.len()
    );
    slots
}

/// Encode payload values on a frequency-domain carrier, one block per
/// record, returning the real and imaginary parts.
pub fn encode_frequency_domain(values: &[i64]) -> (Vec<f64>, Vec<f64>) {
    let mut real = vec![0.0; values.len() * QUERY_BLOCK];
    let mut imag = vec![0.0; values.len() * QUERY_BLOCK];
    for (record, &value) in values.iter().enumerate() {
        for offset in 0..QUERY_BLOCK {
            let (cos, sin) = carrier(offset);
            real[record * QUERY_BLOCK + offset] = value as f64 * cos;
            imag[record * QUERY_BLOCK + offset] = value as f64 * sin;
        }
    }
    (real, imag)
}

/// Recover the masked payload sum from the two reduced frequency-domain
/// outputs of an executed graph.
///
/// The first block of each output carries the sum of the selected records'
/// carriers; projecting back onto the carrier and rounding recovers the
/// integer sum exactly.
pub fn decode_frequency_domain_outputs(
    dag: &Dag,
    record_count: usize,
    real_name: &str,
    imag_name: &str,
) -> Result<i64, DecryptError> {
    if record_count != dag.record_count() {
        return Err(DecryptError::RecordCountMismatch {
            got: record_count,
            expected: dag.record_count(),
        });
    }
    let real = dag.output_slots(real_name)?;
    let imag = dag.output_slots(imag_name)?;
    for (name, slots) in [(real_name, real), (imag_name, imag)] {
        if slots.len() < QUERY_BLOCK {
            return Err(DecryptError::ShapeMismatch {
                name: name.to_string(),
                width: slots.len(),
                expected: QUERY_BLOCK,
            });
        }
    }

    let projected: f64 = (0..QUERY_BLOCK)
        .map(|slot| {
            let (cos, sin) = carrier(slot);
            real[slot] * cos + imag[slot] * sin
        })
        .sum();
    Ok((projected / QUERY_BLOCK as f64).round() as i64)
}

/// Recover a record count from a reduced 0/1 mask output.
pub fn decode_count_output(dag: &Dag, name: &str) -> Result<i64, DecryptError> {
    let slots = dag.output_slots(name)?;
    match slots.first() {
        Some(count) => Ok(count.round() as i64),
        None => Err(DecryptError::ShapeMismatch {
            name: name.to_string(),
            width: 0,
            expected: 1,
        }),
    }
}
