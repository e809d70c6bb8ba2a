//! `tally add-block` — manual block registration.

use tally_core::TimeBlock;

use crate::util::{core_err, load_config, open_store, parse_date, parse_time};
use crate::{CliError, GlobalArgs};

pub fn cmd_add_block(
    globals: &GlobalArgs,
    title: String,
    date: String,
    start: String,
    end: String,
) -> Result<(), CliError> {
    let date = parse_date(&date)?;
    let start = parse_time(&start)?;
    let end = parse_time(&end)?;

    let config = load_config(globals.config.as_deref())?;
    let mut store = open_store(globals.store.as_deref(), &config)?;

    let block = TimeBlock::new(title, date, start, end).map_err(core_err)?;
    let title = block.title.clone();
    store.add_block(block).map_err(core_err)?;
    store.save().map_err(core_err)?;

    eprintln!("registered block '{title}' on {date} ({start} to {end})");
    Ok(())
}
