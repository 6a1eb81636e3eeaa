//! CSV export of the scored candidate table, one row per surviving split in search order.

use std::io::Write;

use serde::Serialize;

use crate::optimizer::ranking::round_percent;
use crate::optimizer::search::CandidateEvaluation;

#[derive(Debug, Serialize)]
struct CandidateRow {
    rolled: u32,
    expansion: u32,
    reserved: u32,
    display_min: u32,
    display_max: u32,
    computation_min: u32,
    computation_max: u32,
    probability: f64,
    success_percent: f64,
    method: &'static str,
    best: bool,
}

/// Write `candidates` as CSV with a header row. `best` marks the winning row, if any.
pub fn write_candidates_csv<W: Write>(
    writer: W,
    candidates: &[CandidateEvaluation],
    best: Option<&CandidateEvaluation>,
) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for candidate in candidates {
        out.serialize(CandidateRow {
            rolled: candidate.allocation.rolled,
            expansion: candidate.allocation.expansion,
            reserved: candidate.allocation.reserved,
            display_min: candidate.display_window.min,
            display_max: candidate.display_window.max,
            computation_min: candidate.computation_window.min,
            computation_max: candidate.computation_window.max,
            probability: candidate.probability,
            success_percent: round_percent(candidate.probability),
            method: candidate.method.as_str(),
            best: best.map_or(false, |b| std::ptr::eq(b, candidate)),
        })?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::difficulty::DifficultyRegistry;
    use crate::optimizer::search::{evaluate_candidates, select_best, SearchOptions};

    #[test]
    fn export_writes_header_and_marks_best() {
        let candidates = evaluate_candidates(
            DifficultyRegistry::builtin(),
            4,
            "leicht",
            1,
            &SearchOptions::default(),
        )
        .expect("valid difficulty");
        let best = select_best(&candidates);

        let mut buffer = Vec::new();
        write_candidates_csv(&mut buffer, &candidates, best).expect("csv write");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("rolled,expansion,reserved,display_min,display_max,computation_min,computation_max,probability,success_percent,method,best")
        );
        assert_eq!(lines.clone().count(), candidates.len());
        assert_eq!(lines.filter(|line| line.ends_with(",true")).count(), 1);
    }
}
