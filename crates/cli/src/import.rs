//! `tally import` — check-in sheet ingestion.

use std::path::PathBuf;

use tally_core::{AttendanceBlock, Delta, Error, TimeBlock};
use tally_io::CheckinSheet;

use crate::exit_codes::{EXIT_NO_FITTING_BLOCK, EXIT_PARSE};
use crate::util::{core_err, load_config, open_store};
use crate::{CliError, GlobalArgs};

pub fn cmd_import(
    globals: &GlobalArgs,
    sheet_path: PathBuf,
    threshold: Option<i64>,
    title: Option<String>,
) -> Result<(), CliError> {
    let config = load_config(globals.config.as_deref())?;
    let threshold = match threshold {
        Some(minutes) if (0..60).contains(&minutes) => Delta::minutes(minutes),
        Some(minutes) => {
            return Err(CliError::args(format!(
                "--threshold must be between 0 and 59, got {minutes}"
            )));
        }
        None => config.threshold(),
    };

    let sheet = CheckinSheet::load(&sheet_path)
        .map_err(|e| CliError { code: EXIT_PARSE, message: e.to_string(), hint: None })?;

    let mut store = open_store(globals.store.as_deref(), &config)?;

    // Resolve the sheet's span to a registered block. When none fits, the
    // sheet itself defines a new block and the import merges into that.
    let block = match tally_core::block_for_span(
        sheet.date,
        sheet.start,
        sheet.end,
        &store.blocks,
        threshold,
    ) {
        Ok(block) => block.clone(),
        Err(Error::NoFittingBlock { .. }) => {
            let title = title.unwrap_or_else(|| sheet.name.clone());
            let block = TimeBlock::new(title, sheet.date, sheet.start, sheet.end)
                .map_err(core_err)?;
            store.add_block(block.clone()).map_err(|err| CliError {
                code: EXIT_NO_FITTING_BLOCK,
                message: err.to_string(),
                hint: Some(
                    "no registered block fits this sheet's span and a block \
                     with this title already exists; pass --title"
                        .to_string(),
                ),
            })?;
            eprintln!(
                "no registered block fits {} {} to {}; registered '{}'",
                block.date, block.start, block.end, block.title
            );
            block
        }
        Err(err) => return Err(core_err(err)),
    };

    let attendance = AttendanceBlock::from_records(block, &sheet.records);
    let title = attendance.block.title.clone();
    let count = attendance.attenders.len();
    store.add_attendances(attendance);
    store.save().map_err(core_err)?;

    eprintln!("imported '{}' into block '{title}': {count} attenders", sheet.name);
    Ok(())
}
