use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, info_span};

use tally_cli::edits::CellAssignment;
use tally_cli::render::{CheckReport, results_table};
use tally_core::{
    CellEvent, CompetitorDirectory, EditorSession, EditorSettings, JsonFileStore, SaveOutcome,
};
use tally_model::{CompetitorId, EntryMode};

use crate::cli::{CheckArgs, EditArgs, ShowArgs};

pub fn run_show(args: &ShowArgs, settings: &EditorSettings) -> Result<()> {
    let (_, mut session) = open(&args.document, settings)?;
    if let Some(path) = &args.athletes {
        let directory = CompetitorDirectory::load(path)
            .context("load athlete directory")?
            .with_team_colors(settings.display.team_colors.clone());
        session.resolve_labels(&directory);
    }

    let document = session.document();
    let mut title = document.name().unwrap_or("(unnamed event)").to_string();
    if let Some(distance) = document.distance() {
        title.push_str(&format!(" / {distance}"));
    }
    if let Some(date) = document.raw_date() {
        title.push_str(&format!(" / {date}"));
    }
    println!("{title} [{}]", document.event_type());
    println!("{}", results_table(session.table()));

    let report = CheckReport::from_table(session.table());
    if !report.is_clean() {
        eprintln!("{report}");
    }
    Ok(())
}

pub fn run_check(args: &CheckArgs, settings: &EditorSettings) -> Result<CheckReport> {
    let (_, session) = open(&args.document, settings)?;
    Ok(CheckReport::from_table(session.table()))
}

pub fn run_edit(args: &EditArgs, settings: &EditorSettings) -> Result<()> {
    let span = info_span!("edit", document = %args.document.display());
    let _guard = span.enter();

    let mut settings = settings.clone();
    if args.relaxed {
        settings.editing.attempts_mode = EntryMode::Relaxed;
    }
    let (store, mut session) = open(&args.document, &settings)?;

    for height in &args.add_height {
        session
            .add_height(height)
            .with_context(|| format!("add height {height}"))?;
    }
    for id in &args.add {
        let competitor = CompetitorId::new(id.as_str())?;
        session.add_competitor(competitor);
    }
    for assignment in &args.set {
        apply_assignment(&mut session, assignment)?;
    }
    for swap in &args.swap {
        session
            .swap_competitors(&swap.first, &swap.second)
            .with_context(|| format!("swap {swap}"))?;
    }
    for id in &args.delete {
        let competitor = CompetitorId::new(id.as_str())?;
        session
            .delete_competitor(&competitor)
            .with_context(|| format!("delete {competitor}"))?;
    }

    if !session.is_dirty() {
        info!("nothing to change");
        println!("no changes");
        return Ok(());
    }

    let mut target = match &args.output {
        Some(path) => JsonFileStore::new(path),
        None => store,
    };
    match session.save(&mut target) {
        SaveOutcome::Saved => {
            println!(
                "wrote {} results to {}",
                session.table().live_rows().count(),
                target.path().display()
            );
            Ok(())
        }
        SaveOutcome::Rejected(error) => {
            bail!("refusing to write {}: {error}", target.path().display())
        }
        SaveOutcome::Failed(error) => Err(error.into()),
    }
}

fn open(path: &Path, settings: &EditorSettings) -> Result<(JsonFileStore, EditorSession)> {
    let store = JsonFileStore::new(path);
    let document = store.load()?;
    let session = EditorSession::open(document, settings)
        .with_context(|| format!("bind results of {}", path.display()))?;
    debug!(
        path = %path.display(),
        rows = session.table().rows().len(),
        "opened document"
    );
    Ok((store, session))
}

fn apply_assignment(session: &mut EditorSession, assignment: &CellAssignment) -> Result<()> {
    let kind = session
        .table()
        .column(&assignment.column)
        .map(|column| column.kind.clone())
        .with_context(|| format!("no column {} in this event", assignment.column))?;
    let input = assignment.input_for(&kind)?;
    let event = session
        .edit_competitor(&assignment.competitor, &assignment.column, input)
        .with_context(|| format!("cannot apply {assignment}"))?;
    if let CellEvent::Changed { warnings } = event {
        for warning in warnings {
            eprintln!("warning: {assignment}: {warning}");
        }
    }
    Ok(())
}
