use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use portal::{
    filter::SortMode,
    models::{CommentId, NewTag, StudentId, WorkId, WorkRequest},
    search::Query,
};
use strum::Display;
use tracing::Level;

use crate::PROJECT_DIRS;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(short, long, env = "PORTAL_LOG", default_value_t = Level::INFO)]
    pub log_level: Level,
    #[arg(long, default_value = PROJECT_DIRS.data_dir().join("portal.log").into_os_string())]
    pub log_location: PathBuf,
    #[arg(short, long, default_value = PROJECT_DIRS.config_dir().join("config.toml").into_os_string())]
    pub config: PathBuf,
    /// Bearer token of the signed in user, as printed by `portal login`.
    #[arg(long, env = "PORTAL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the newest and the best rated works.
    Home {
        #[command(flatten)]
        display_options: WorkDisplayOptions,
    },
    Work {
        #[command(subcommand)]
        command: WorkCommand,
    },
    Comment {
        #[command(subcommand)]
        command: CommentCommand,
    },
    Bookmark {
        #[command(subcommand)]
        command: BookmarkCommand,
    },
    /// Rate a work with 1 to 5 stars.
    Rate { work: WorkId, score: u8 },
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },
    /// Manage student accounts, requires an administrator.
    Student {
        #[command(subcommand)]
        command: StudentCommand,
    },
    /// Sign in and print the session token.
    Login { email: Option<String> },
    /// Create an account and print the session token.
    Register,
    /// Forget the local bookmarks of the signed in user.
    Logout,
    /// Write the default config file, replacing the existing one.
    WriteConfig,
}

#[derive(Subcommand)]
pub enum WorkCommand {
    List {
        /// Search query, e.g. `tag:math "graph theory" -author:novak`.
        query: Option<Query>,
        /// Plain text matched against title, description and author.
        #[arg(long)]
        text: Option<String>,
        /// Only show works with any of these tags.
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(short, long)]
        sort: Option<SortMode>,
        #[arg(long)]
        limit: Option<usize>,
        /// Print how the query was understood.
        #[arg(long)]
        explain: bool,
        #[command(flatten)]
        display_options: WorkDisplayOptions,
    },
    Show {
        id: WorkId,
    },
    Add {
        #[command(flatten)]
        details: WorkDetails,
    },
    Update {
        id: WorkId,
        #[command(flatten)]
        details: WorkDetails,
    },
    Delete {
        id: WorkId,
    },
}

#[derive(Subcommand)]
pub enum CommentCommand {
    List {
        work: WorkId,
    },
    Add {
        work: WorkId,
        /// The comment text, prompted for when missing.
        content: Option<String>,
        /// Name shown with the comment, defaults to the signed in user.
        #[arg(short, long)]
        author: Option<String>,
    },
    Delete {
        id: CommentId,
    },
}

#[derive(Subcommand)]
pub enum BookmarkCommand {
    Add {
        work: WorkId,
    },
    Remove {
        work: WorkId,
    },
    Toggle {
        work: WorkId,
    },
    List {
        #[command(flatten)]
        display_options: WorkDisplayOptions,
    },
}

#[derive(Subcommand)]
pub enum TagCommand {
    List {
        /// Order by how many works use the tag.
        #[arg(short, long)]
        popular: bool,
    },
    Create {
        name: String,
    },
}

#[derive(Subcommand)]
pub enum StudentCommand {
    List,
    Show {
        id: StudentId,
    },
    Add {
        #[command(flatten)]
        details: StudentDetails,
    },
    Update {
        id: StudentId,
        #[command(flatten)]
        details: StudentDetails,
    },
    Delete {
        id: StudentId,
    },
}

#[derive(Default, Clone, Args)]
pub struct WorkDetails {
    /// A list of tags to associate with the work.
    pub tags: Vec<String>,
    /// The title of the work.
    #[arg(short, long)]
    pub title: Option<String>,
    /// A short description of the work.
    #[arg(short, long)]
    pub description: Option<String>,
    /// Where the work's document can be downloaded.
    #[arg(short, long)]
    pub file_url: Option<url::Url>,
}

impl From<WorkDetails> for WorkRequest {
    fn from(
        WorkDetails {
            tags,
            title,
            description,
            file_url,
        }: WorkDetails,
    ) -> Self {
        Self {
            title: title.unwrap_or_default(),
            description,
            file_url: file_url.map(|url| url.to_string()).unwrap_or_default(),
            student_id: None,
            tags: tags.into_iter().map(NewTag::new).collect(),
        }
    }
}

#[derive(Default, Clone, Args)]
pub struct StudentDetails {
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub email: Option<String>,
    /// Prompt for a new password.
    #[arg(short, long)]
    pub password: bool,
}

#[derive(Clone, Copy, Display, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum WorkColumn {
    Id,
    Title,
    Author,
    Submitted,
    Tags,
    Comments,
    Rating,
    Average,
    Bookmarked,
    Description,
    File,
}

#[derive(Clone, Args)]
pub struct WorkDisplayOptions {
    /// Columns to display.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [WorkColumn::Id, WorkColumn::Title, WorkColumn::Author, WorkColumn::Submitted, WorkColumn::Tags, WorkColumn::Rating])]
    pub columns: Vec<WorkColumn>,
}
