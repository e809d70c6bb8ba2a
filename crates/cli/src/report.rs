//! `tally report` — per-slot attendance for one class.

use std::path::PathBuf;

use serde::Serialize;

use tally_core::{aggregate_schedule, Class, Error, SlotAttendance, Store};
use tally_io::{FileRoster, RosterProvider};

use crate::exit_codes::EXIT_PARSE;
use crate::util::{core_err, load_config, open_store};
use crate::{CliError, GlobalArgs};

/// One schedule slot in the rendered report.
#[derive(Debug, Serialize)]
struct SlotReport {
    slot: String,
    weekday: String,
    time: String,
    credits: u32,
    sessions: usize,
    attenders: Vec<AttenderReport>,
}

#[derive(Debug, Serialize)]
struct AttenderReport {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct ClassReport {
    subject_id: String,
    class_id: String,
    semester: String,
    enrolled: usize,
    slots: Vec<SlotReport>,
}

pub fn cmd_report(
    globals: &GlobalArgs,
    subject_id: String,
    class_id: String,
    semester: String,
    roster: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(globals.config.as_deref())?;
    let mut store = open_store(globals.store.as_deref(), &config)?;

    let class = resolve_class(&mut store, &subject_id, &class_id, &semester, roster)?;
    let slots = aggregate_schedule(&store.attendances, &class);

    let report = ClassReport {
        subject_id: class.subject_id.clone(),
        class_id: class.class_id.clone(),
        semester: class.semester.clone(),
        enrolled: class.students.len(),
        slots: slots
            .iter()
            .map(|(slot, att)| SlotReport {
                slot: slot.slot_title(),
                weekday: slot.weekday.to_string(),
                time: slot.time.format("%H:%M").to_string(),
                credits: slot.credits,
                sessions: att.session_count,
                attenders: attender_rows(&store, att),
            })
            .collect(),
    };

    if let Some(ref path) = output {
        write_csv(path, &report)?;
        eprintln!("wrote {}", path.display());
    }

    if json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    eprintln!(
        "{}-{} ({}): {} enrolled, {} slots",
        report.subject_id, report.class_id, report.semester, report.enrolled, report.slots.len()
    );
    for slot in &report.slots {
        if slot.sessions == 0 {
            eprintln!("  {:<18} no sessions recorded", slot.slot);
        } else {
            eprintln!(
                "  {:<18} {} sessions, {}/{} attended",
                slot.slot, slot.sessions, slot.attenders.len(), report.enrolled
            );
        }
    }

    Ok(())
}

/// Cached class, or fetch-and-cache through the roster when it is not
/// cached yet.
fn resolve_class(
    store: &mut Store,
    subject_id: &str,
    class_id: &str,
    semester: &str,
    roster: Option<PathBuf>,
) -> Result<Class, CliError> {
    match store.load_class(subject_id, class_id, semester) {
        Ok(class) => Ok(class.clone()),
        Err(err @ Error::ClassNotFound { .. }) => {
            let Some(roster_path) = roster else {
                return Err(core_err(err));
            };
            let (class, students) = FileRoster::new(roster_path)
                .fetch(subject_id, class_id, semester)
                .map_err(|e| CliError { code: EXIT_PARSE, message: e.to_string(), hint: None })?;
            store.add_students(students);
            store.add_class(class.clone()).map_err(core_err)?;
            store.save().map_err(core_err)?;
            eprintln!("cached class {subject_id}-{class_id} for {semester}");
            Ok(class)
        }
        Err(err) => Err(core_err(err)),
    }
}

/// Attender rows with display names from the store's restricted mapping.
/// Ids the mapping drops keep their row with an empty name; the id itself
/// is the stable identity the report promises.
fn attender_rows(store: &Store, att: &SlotAttendance) -> Vec<AttenderReport> {
    let names = store.students_with_ids(&att.attenders);
    att.attenders
        .iter()
        .map(|id| AttenderReport {
            id: id.clone(),
            name: names.get(id).cloned().unwrap_or_default(),
        })
        .collect()
}

fn write_csv(path: &PathBuf, report: &ClassReport) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;

    writer
        .write_record(["slot", "weekday", "time", "credits", "sessions", "attenders"])
        .map_err(|e| CliError::io(e.to_string()))?;

    for slot in &report.slots {
        let attenders =
            slot.attenders.iter().map(|a| a.id.as_str()).collect::<Vec<_>>().join(";");
        let credits = slot.credits.to_string();
        let sessions = slot.sessions.to_string();
        writer
            .write_record([
                slot.slot.as_str(),
                slot.weekday.as_str(),
                slot.time.as_str(),
                credits.as_str(),
                sessions.as_str(),
                attenders.as_str(),
            ])
            .map_err(|e| CliError::io(e.to_string()))?;
    }

    writer.flush().map_err(|e| CliError::io(e.to_string()))
}
