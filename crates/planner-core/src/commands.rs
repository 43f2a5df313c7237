use anyhow::anyhow;
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::app_state::PlannerState;
use crate::cli::{Command, Edge, FilterArgs};
use crate::datastore::SnapshotStorage;
use crate::datetime::{DateRange, add_days, to_iso_date};
use crate::filter::TimeWindow;
use crate::interaction::{GestureEnd, Grip};
use crate::render::Renderer;
use crate::task::{Category, TaskId};
use crate::video::{embed_target, embed_url};

/// Runs one subcommand against the planner state. `None` prints the
/// current month.
#[instrument(skip(state, renderer, command))]
pub fn dispatch<S: SnapshotStorage>(
    state: &mut PlannerState<S>,
    renderer: &Renderer,
    command: Option<Command>,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let command = command.unwrap_or(Command::Month {
        month: None,
        filters: FilterArgs::default(),
    });
    debug!(?command, "dispatching command");

    match command {
        Command::Month { month, filters } => cmd_month(state, renderer, month, filters, today),
        Command::List { month, filters } => cmd_list(state, renderer, month, filters, today),
        Command::Add {
            name,
            category,
            start,
            end,
            video,
        } => cmd_add(state, name, category, start, end, video, today),
        Command::Edit {
            id,
            name,
            category,
            start,
            end,
            video,
            clear_video,
        } => cmd_edit(state, &id, name, category, start, end, video, clear_video),
        Command::Move { id, days } => cmd_move(state, &id, days),
        Command::Resize { id, edge, to } => cmd_resize(state, &id, edge, to),
        Command::Delete { id } => cmd_delete(state, &id),
        Command::Embed { url } => cmd_embed(&url),
    }?;

    if let Some(err) = state.take_persist_error() {
        return Err(anyhow!(err).context("task changes were not saved"));
    }
    Ok(())
}

fn apply_filter_args<S: SnapshotStorage>(
    state: &mut PlannerState<S>,
    month: Option<NaiveDate>,
    filters: FilterArgs,
    today: NaiveDate,
) -> anyhow::Result<()> {
    state.go_to_month(month.unwrap_or(today));

    if !filters.categories.is_empty() {
        for category in Category::ALL {
            let wanted = filters.categories.contains(&category);
            if wanted != state.filters().categories.contains(&category) {
                state.toggle_category(category);
            }
        }
    }
    if let Some(weeks) = filters.weeks {
        let window = TimeWindow::try_from(weeks).map_err(|err| anyhow!(err))?;
        state.set_time_window(window);
    }
    if let Some(search) = filters.search {
        state.set_search(search);
    }

    debug!(filters = ?state.filters(), month = %state.month(), "filters applied");
    Ok(())
}

#[instrument(skip(state, renderer, filters))]
fn cmd_month<S: SnapshotStorage>(
    state: &mut PlannerState<S>,
    renderer: &Renderer,
    month: Option<NaiveDate>,
    filters: FilterArgs,
    today: NaiveDate,
) -> anyhow::Result<()> {
    info!("command month");
    apply_filter_args(state, month, filters, today)?;
    renderer.print_month(&state.layout(today))
}

#[instrument(skip(state, renderer, filters))]
fn cmd_list<S: SnapshotStorage>(
    state: &mut PlannerState<S>,
    renderer: &Renderer,
    month: Option<NaiveDate>,
    filters: FilterArgs,
    today: NaiveDate,
) -> anyhow::Result<()> {
    info!("command list");
    apply_filter_args(state, month, filters, today)?;

    let mut tasks = state.visible_tasks();
    tasks.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    renderer.print_task_table(&tasks)
}

#[instrument(skip(state, name, video))]
fn cmd_add<S: SnapshotStorage>(
    state: &mut PlannerState<S>,
    name: String,
    category: Option<Category>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    video: Option<String>,
    today: NaiveDate,
) -> anyhow::Result<()> {
    info!("command add");

    let start = start.unwrap_or(today);
    state.open_new_task(start);
    let editor = state
        .editor_mut()
        .ok_or_else(|| anyhow!("task editor did not open"))?;
    editor.name = name;
    if let Some(category) = category {
        editor.category = category;
    }
    if let Some(end) = end {
        editor.end = end;
    }
    if let Some(video) = video {
        editor.video_url = video;
    }

    let id = submit(state)?;
    println!("Created task {id}.");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
#[instrument(skip(state, name, video))]
fn cmd_edit<S: SnapshotStorage>(
    state: &mut PlannerState<S>,
    id: &str,
    name: Option<String>,
    category: Option<Category>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    video: Option<String>,
    clear_video: bool,
) -> anyhow::Result<()> {
    info!("command edit");

    let id = resolve_id(state, id)?;
    state.open_editor(&id);
    let editor = state
        .editor_mut()
        .ok_or_else(|| anyhow!("task editor did not open"))?;
    if let Some(name) = name {
        editor.name = name;
    }
    if let Some(category) = category {
        editor.category = category;
    }
    if let Some(start) = start {
        editor.start = start;
    }
    if let Some(end) = end {
        editor.end = end;
    }
    if let Some(video) = video {
        editor.video_url = video;
    }
    if clear_video {
        editor.video_url.clear();
    }

    let id = submit(state)?;
    println!("Saved task {id}.");
    Ok(())
}

/// Replays a body drag from the task's first day to `days` later.
#[instrument(skip(state))]
fn cmd_move<S: SnapshotStorage>(state: &mut PlannerState<S>, id: &str, days: i64) -> anyhow::Result<()> {
    info!("command move");

    let id = resolve_id(state, id)?;
    let start = task_range(state, &id)?.start;
    let target = add_days(start, days);
    if target == start && days != 0 {
        return Err(anyhow!("cannot move task by {days} days"));
    }

    let range = replay_gesture(state, &id, Grip::Body, start, target)?;
    println!("Moved task {id} to {} .. {}.", to_iso_date(range.start), to_iso_date(range.end));
    Ok(())
}

/// Replays a handle drag; the edge stops at the opposite bound.
#[instrument(skip(state))]
fn cmd_resize<S: SnapshotStorage>(
    state: &mut PlannerState<S>,
    id: &str,
    edge: Edge,
    to: NaiveDate,
) -> anyhow::Result<()> {
    info!("command resize");

    let id = resolve_id(state, id)?;
    let current = task_range(state, &id)?;
    let (grip, from) = match edge {
        Edge::Start => (Grip::StartHandle, current.start),
        Edge::End => (Grip::EndHandle, current.end),
    };

    let range = replay_gesture(state, &id, grip, from, to)?;
    let landed = match edge {
        Edge::Start => range.start,
        Edge::End => range.end,
    };
    if landed != to {
        warn!(requested = %to, landed = %landed, "resize clamped at the opposite edge");
    }
    println!("Resized task {id} to {} .. {}.", to_iso_date(range.start), to_iso_date(range.end));
    Ok(())
}

#[instrument(skip(state))]
fn cmd_delete<S: SnapshotStorage>(state: &mut PlannerState<S>, id: &str) -> anyhow::Result<()> {
    info!("command delete");

    let id = resolve_id(state, id)?;
    state.open_editor(&id);
    let deleted = state
        .delete_from_editor()
        .ok_or_else(|| anyhow!("task editor did not open"))??;
    println!("Deleted task {deleted}.");
    Ok(())
}

fn cmd_embed(url: &str) -> anyhow::Result<()> {
    match embed_target(url) {
        Some((provider, _)) => debug!(?provider, "recognized video link"),
        None => debug!("unrecognized video link; echoing it back"),
    }
    println!("{}", embed_url(url));
    Ok(())
}

fn submit<S: SnapshotStorage>(state: &mut PlannerState<S>) -> anyhow::Result<TaskId> {
    let result = state
        .submit_editor()
        .ok_or_else(|| anyhow!("task editor is not open"))?;
    state.close_editor();
    Ok(result?)
}

fn resolve_id<S: SnapshotStorage>(state: &PlannerState<S>, prefix: &str) -> anyhow::Result<TaskId> {
    state
        .store()
        .resolve(prefix)
        .map(|task| task.id.clone())
        .ok_or_else(|| anyhow!("no single task matches id {prefix:?}"))
}

fn task_range<S: SnapshotStorage>(state: &PlannerState<S>, id: &TaskId) -> anyhow::Result<DateRange> {
    state
        .store()
        .get(id)
        .map(|task| task.range())
        .ok_or_else(|| anyhow!("task {id} disappeared"))
}

fn replay_gesture<S: SnapshotStorage>(
    state: &mut PlannerState<S>,
    id: &TaskId,
    grip: Grip,
    from: NaiveDate,
    to: NaiveDate,
) -> anyhow::Result<DateRange> {
    if !state.press_task(id, grip, from) {
        return Err(anyhow!("could not start a gesture on task {id}"));
    }
    state.hover_cell(to);
    match state.release() {
        GestureEnd::Commit { range, .. } => Ok(range),
        other => Err(anyhow!("gesture on task {id} ended without a commit: {other:?}")),
    }
}
