use anyhow::Result;
use clap::Subcommand;

use crate::{
    storage::user_store::UserStore, timeline::engine::TimelineEngine, utils::clock::DefaultClock,
};

use super::{render::Renderer, select::StdinSelector};

const DEFAULT_LOG_ENTRIES: usize = 5;

/// Commands operating on an existing timeline.
#[derive(Subcommand, Debug)]
pub enum TimelineCommand {
    #[command(about = "Start a new activity. The ongoing one, if any, is stopped first.")]
    Start {
        #[arg(value_name = "ACTIVITY")]
        activity: String,
    },
    #[command(about = "Stop the current activity.")]
    Stop,
    #[command(about = "Make a new activity.")]
    Make {
        #[arg(
            long,
            short,
            help = "When creating an activity with an absolute path, make any non-existing parents. \
                    For example `tyme make -p /projects/tyme` creates /projects if it doesn't exist yet."
        )]
        parents: bool,
        #[arg(
            value_name = "ACTIVITY-OR-PATH",
            help = "Either a name like 'cooking' or an absolute path like '/leisure/netflix'. \
                    A name opens an interactive menu to decide where to place the activity."
        )]
        activity: String,
    },
    #[command(about = "Output the current activity if any.")]
    Status,
    #[command(about = "Show recent activities. Untracked time between them is shown in red.")]
    Log {
        #[arg(value_name = "COUNT", default_value_t = DEFAULT_LOG_ENTRIES)]
        number: usize,
    },
    #[command(about = "Get the full path of an activity.")]
    Where {
        #[arg(value_name = "ACTIVITY")]
        activity: String,
    },
    #[command(about = "List every activity path.")]
    Activities,
}

/// Loads the user's timeline, runs the command and saves the result. Only successful commands
/// that change the timeline are saved.
pub fn process_timeline_command(
    command: TimelineCommand,
    store: UserStore,
    user: Option<&str>,
    renderer: &Renderer,
) -> Result<()> {
    let mut engine = TimelineEngine::load(store, user, Box::new(DefaultClock))?;

    match command {
        TimelineCommand::Start { activity } => {
            let closed = engine.start(&activity)?;
            engine.save()?;
            renderer.started(&activity, closed.as_ref());
        }
        TimelineCommand::Stop => {
            let closed = engine.stop()?;
            engine.save()?;
            renderer.stopped(&closed);
        }
        TimelineCommand::Make { parents, activity } => {
            let mut selector = StdinSelector::stdin(*renderer);
            let created = engine.create_activity(&activity, parents, &mut selector)?;
            engine.save()?;
            renderer.activity_created(&created.path);
        }
        TimelineCommand::Status => renderer.status(engine.status(), engine.now()),
        TimelineCommand::Log { number } => renderer.log(&engine.recent(number), engine.now()),
        TimelineCommand::Where { activity } => println!("{}", engine.activity_path(&activity)?),
        TimelineCommand::Activities => {
            for path in engine.activities().enumerate_paths() {
                println!("/{path}");
            }
        }
    }
    Ok(())
}
