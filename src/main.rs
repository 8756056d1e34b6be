use anyhow::Result;
use bitlet::LOG_FILTER_ENV;
use bitlet::areas::repository::Repository;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bitlet",
    version = "0.1.0",
    about = "A small single-user version-control system",
    long_about = "Bitlet snapshots the plain files of the current directory into commits, \
    supports branches and merges branches with a three-way merge.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates a repository in the current directory with an \
        initial commit on the main branch."
    )]
    Init,
    #[command(name = "add", about = "Stage a file for the next commit")]
    Add {
        #[arg(index = 1, help = "The file to stage")]
        file: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the staged additions and removals in a new commit \
        on the current branch."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "rm",
        about = "Unstage a file or stage it for removal",
        long_about = "This command unstages a file staged for addition. If the file is tracked \
        by the current commit, it is staged for removal and deleted from the working directory."
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        file: String,
    },
    #[command(name = "log", about = "Show the history of the current branch")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the IDs of the commits with the given message")]
    Find {
        #[arg(index = 1, help = "The exact commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show branches and staged files")]
    Status,
    #[command(
        name = "restore",
        about = "Restore a file from a commit",
        long_about = "This command writes the version of a file recorded in a commit into the \
        working directory. The current commit is used when no source is given."
    )]
    Restore {
        #[arg(short, long, help = "The (possibly abbreviated) commit ID to restore from")]
        source: Option<String>,
        #[arg(index = 1, help = "The file to restore")]
        file: String,
    },
    #[command(name = "branch", about = "Create a branch at the current commit")]
    Branch {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
    #[command(name = "switch", about = "Check out another branch")]
    Switch {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch")]
    RmBranch {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
    #[command(
        name = "reset",
        about = "Check out a commit and move the current branch to it",
        long_about = "This command replaces the tracked files with those of the given commit, \
        moves the current branch to it and clears the stage."
    )]
    Reset {
        #[arg(index = 1, help = "The (possibly abbreviated) commit ID")]
        commit: String,
    },
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1, help = "The branch to merge")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(LOG_FILTER_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let pwd = std::env::current_dir()?;
    let mut repository = Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))?;

    match &cli.command {
        Commands::Init => repository.init().await?,
        Commands::Add { file } => {
            repository.add(file).await?;
        }
        Commands::Commit { message } => {
            repository.commit(message).await?;
        }
        Commands::Rm { file } => repository.rm(file).await?,
        Commands::Log => repository.log()?,
        Commands::GlobalLog => repository.global_log()?,
        Commands::Find { message } => repository.find(message)?,
        Commands::Status => repository.status().await?,
        Commands::Restore { source, file } => repository.restore(source.as_deref(), file)?,
        Commands::Branch { name } => repository.branch(name)?,
        Commands::Switch { name } => repository.switch(name).await?,
        Commands::RmBranch { name } => repository.rm_branch(name)?,
        Commands::Reset { commit } => repository.reset(commit).await?,
        Commands::Merge { name } => {
            repository.merge(name).await?;
        }
    }

    Ok(())
}
