use api::Priority;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "jobctl")]
#[command(about = "Create, run and inspect tracked jobs.")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "PascalCase")]
pub(crate) enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Create a job, run it and wait until it finishes.
    Run {
        /// Task name recorded on the job
        #[arg(long)]
        task: String,

        /// JSON object or array passed through to the notification
        #[arg(long, default_value = "{}")]
        payload: String,

        #[arg(long, value_enum, default_value = "Medium")]
        priority: PriorityArg,
    },
    /// List jobs, newest first.
    List {
        /// pending, running, completed or failed
        #[arg(long)]
        status: Option<String>,

        /// Low, Medium or High
        #[arg(long)]
        priority: Option<String>,
    },
    /// Print one job.
    Get {
        /// Job id
        id: String,
    },
}
