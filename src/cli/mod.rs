pub mod render;
pub mod select;
pub mod timeline;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use render::Renderer;
use timeline::{process_timeline_command, TimelineCommand};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    storage::user_store::UserStore,
    utils::{
        dir::{create_application_default_path, create_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "tyme", version, long_about = None)]
#[command(about = "Track the time you spend on activities", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        short,
        global = true,
        help = "Specify a user. If this is not present, then the default user is assumed."
    )]
    user: Option<String>,
    #[arg(long = "no-color", short = 'c', global = true, help = "Disable colors globally.")]
    no_color: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME/tyme or $HOME/.local/state/tyme"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Create an empty timeline for a new user.")]
    Init {
        #[arg(value_name = "USER")]
        name: String,
        #[arg(long, help = "Make this user the default one.")]
        default: bool,
    },
    #[command(flatten)]
    Timeline(TimelineCommand),
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => create_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;
    debug!("Running {:?}", args.commands);

    let renderer = Renderer::new(!args.no_color);
    let store = UserStore::new(app_dir);

    match args.commands {
        Commands::Init { name, default } => {
            let path = store.init_user(&name, default)?;
            renderer.user_created(&name, &path);
            Ok(())
        }
        Commands::Timeline(command) => {
            process_timeline_command(command, store, args.user.as_deref(), &renderer)
        }
    }
}
