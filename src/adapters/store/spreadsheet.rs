use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::domain::{Sample, COLUMNS};
use crate::ports::SinkResult;

pub const SHEET_NAME: &str = "stats";

/// Write the whole run to a single-sheet workbook, one row per sample
pub fn export_xlsx(path: &Path, samples: &[Sample]) -> SinkResult<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let timestamp = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (index, sample) in samples.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_datetime_with_format(row, 0, &sample.timepoint.naive_local(), &timestamp)?;
        worksheet.write_string(row, 1, &sample.container_id)?;
        worksheet.write_string(row, 2, &sample.name)?;

        let measures = [
            sample.cpu_percent,
            sample.mem_usage,
            sample.mem_limit,
            sample.mem_percent,
            sample.net_in,
            sample.net_out,
            sample.block_in,
            sample.block_out,
        ];
        for (offset, value) in measures.into_iter().enumerate() {
            worksheet.write_number(row, 3 + offset as u16, value)?;
        }

        worksheet.write_number(row, 11, sample.pids as f64)?;
    }

    worksheet.set_column_width(0, 20)?;
    workbook.save(path)?;

    Ok(())
}
