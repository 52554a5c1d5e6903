//! Command line surface.

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "evalboard",
    about = "Score proposals with a reviewer panel and rank them by trimmed mean",
    version
)]
pub(crate) struct Cli {
    /// Database file; overrides EVALBOARD_DB
    #[arg(long, global = true)]
    pub(crate) db: Option<std::path::PathBuf>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create the database and install the default rubric
    Init,
    /// Print the installed rubric with per-grade item scores
    Rubric,
    /// Manage proposals
    Proposal {
        #[command(subcommand)]
        command: ProposalCommand,
    },
    /// Manage reviewers
    Reviewer {
        #[command(subcommand)]
        command: ReviewerCommand,
    },
    /// Save one reviewer's complete grade sheet for one proposal
    Score(ScoreArgs),
    /// Replace the comment of a saved evaluation
    Comment(CommentArgs),
    /// Submit a reviewer's evaluations, freezing them
    Submit(ReviewerArg),
    /// Re-open a submitted reviewer (administrator)
    Unlock(ReviewerArg),
    /// Inspect or preview one reviewer's grade sheet
    Evaluation {
        #[command(subcommand)]
        command: EvaluationCommand,
    },
    /// Per-reviewer totals and trimming flags for one proposal
    Aggregate(AggregateArgs),
    /// Ranked results board
    Results(OutputArgs),
    /// Completion per reviewer and coverage per proposal
    Progress(OutputArgs),
    /// Stored row counts
    Status(OutputArgs),
    /// Delete every score, evaluation and reviewer
    Reset {
        /// Required acknowledgement
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum ProposalCommand {
    /// Add a proposal (order defaults to the end of the list)
    Add {
        name: String,
        #[arg(long)]
        order: Option<i64>,
    },
    /// List proposals in display order
    List,
    /// Rename and/or reorder a proposal
    Rename {
        /// Proposal id or exact name
        proposal: String,
        name: String,
        #[arg(long)]
        order: Option<i64>,
    },
    /// Delete a proposal with all of its scores
    Delete {
        /// Proposal id or exact name
        proposal: String,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum ReviewerCommand {
    /// Find or register a reviewer by display name
    Login { name: String },
    /// List reviewers with their submission state
    List,
    /// Change a reviewer's display name
    Rename {
        /// Reviewer id or display name
        reviewer: String,
        name: String,
    },
    /// Delete a reviewer with all of their scores
    Delete {
        /// Reviewer id or display name
        reviewer: String,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum EvaluationCommand {
    /// Show a saved evaluation with its grades
    Show(EvaluationShowArgs),
    /// Compute a running total without saving anything
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
pub(crate) struct EvaluationShowArgs {
    /// Reviewer id or display name
    #[arg(long)]
    pub(crate) reviewer: String,
    /// Proposal id or exact name
    #[arg(long)]
    pub(crate) proposal: String,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Args, Debug)]
pub(crate) struct PreviewArgs {
    /// `criterion=grade`, grade as 1-5 or its label; repeatable
    #[arg(long = "grade", value_name = "CRITERION=GRADE")]
    pub(crate) grades: Vec<String>,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Args, Debug)]
pub(crate) struct AggregateArgs {
    /// Proposal id or exact name
    pub(crate) proposal: String,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ReviewerArg {
    /// Reviewer id or display name
    pub(crate) reviewer: String,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Reviewer id or display name
    #[arg(long)]
    pub(crate) reviewer: String,
    /// Proposal id or exact name
    #[arg(long)]
    pub(crate) proposal: String,
    /// `criterion=grade`, grade as 1-5 or its label; repeatable
    #[arg(long = "grade", value_name = "CRITERION=GRADE")]
    pub(crate) grades: Vec<String>,
    /// Grade applied to every criterion not listed with --grade
    #[arg(long)]
    pub(crate) fill: Option<String>,
    #[arg(long, default_value = "")]
    pub(crate) comment: String,
}

#[derive(Args, Debug)]
pub(crate) struct CommentArgs {
    /// Reviewer id or display name
    #[arg(long)]
    pub(crate) reviewer: String,
    /// Proposal id or exact name
    #[arg(long)]
    pub(crate) proposal: String,
    pub(crate) comment: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct OutputArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}
