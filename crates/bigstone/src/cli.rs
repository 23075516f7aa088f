use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bigstone")]
#[command(author, version, about)]
#[command(long_about = "Create and catalogue BIGSTONE ports.\n\n\
    Place inputs and outputs on a 16x16 grid, fill in the port's type and role,\n\
    and bigstone derives the standard port name and submits it to the community database.\n\n\
    Examples:\n  \
    bigstone port init                      Start a new port draft\n  \
    bigstone port place 1,1 2,1 3,1=output  Place two inputs and an output\n  \
    bigstone port set type BIN              Choose the port type\n  \
    bigstone port show                      Preview the derived name\n  \
    bigstone port submit                    Add the port to the database")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Port draft file (defaults to defaults.draft in config, then port-draft.yaml)
    #[arg(long, global = true)]
    pub draft: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a port draft and submit it
    Port {
        #[command(subcommand)]
        command: PortCommands,
    },

    /// Upload, locate and delete files in object storage
    Storage {
        #[command(subcommand)]
        command: StorageCommands,
    },

    /// Manage the stored sign-in session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum PortCommands {
    /// Start a new, empty port draft
    Init {
        /// Overwrite an existing draft
        #[arg(long)]
        force: bool,
    },

    /// Set a form field (type, port_count, role, description, passthrough,
    /// input_count, output_count, uses_more_blocks, block_size, show_grid_colors)
    Set {
        /// Field name
        field: String,

        /// Value to set
        value: String,
    },

    /// Place cells on the grid
    Place {
        /// Cells as x,y or x,y=tool (tool: input, output, passthrough, erase)
        #[arg(required = true)]
        cells: Vec<String>,

        /// Tool for cells given without one
        #[arg(short, long, default_value = "input")]
        tool: String,

        /// Colour tag for new cells (palette name or hex value)
        #[arg(long)]
        color: Option<String>,
    },

    /// Remove cells from the grid
    Erase {
        /// Cells as x,y
        #[arg(required = true)]
        cells: Vec<String>,
    },

    /// Record which block sits at a placed cell
    Annotate {
        /// Cell as x,y
        cell: String,

        /// Block name (e.g. Stone, Redstone Lamp)
        #[arg(long)]
        block: String,

        /// Block variation (e.g. Polished, Mossy)
        #[arg(long, default_value = "")]
        variation: String,
    },

    /// Remove every cell from the grid
    Clear,

    /// Show the draft with its derived direction and name
    Show,

    /// Fill in a port interactively
    Create,

    /// Submit the draft to the ports table
    Submit,
}

#[derive(Subcommand)]
pub enum StorageCommands {
    /// Upload a file under your user folder
    Upload {
        /// Bucket name (defaults to defaults.bucket)
        #[arg(short, long)]
        bucket: Option<String>,

        /// File to upload
        file: PathBuf,

        /// Object name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Print the public URL of an object
    Url {
        /// Bucket name (defaults to defaults.bucket)
        #[arg(short, long)]
        bucket: Option<String>,

        /// Object path inside the bucket
        path: String,
    },

    /// Delete an object
    Delete {
        /// Bucket name (defaults to defaults.bucket)
        #[arg(short, long)]
        bucket: Option<String>,

        /// Object path inside the bucket
        path: String,
    },

    /// Upload an image and print its public URL
    Image {
        /// Bucket name (defaults to defaults.bucket)
        #[arg(short, long)]
        bucket: Option<String>,

        /// Image file to upload
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an access token for authenticated requests
    Login {
        /// Access token (JWT) issued by the backend
        #[arg(long)]
        token: String,

        /// User id, if it should not be read from the token
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. backend.url, backend.anon_key, defaults.bucket, defaults.draft)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Port { command }) => {
                crate::commands::port::run(command, self.draft, self.quiet)
            }
            Some(Commands::Storage { command }) => crate::commands::storage::run(command),
            Some(Commands::Auth { command }) => crate::commands::auth::run(command),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("bigstone {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                use clap::CommandFactory;
                let mut cmd = Self::command();
                cmd.print_help()?;
                println!();
                Ok(())
            }
        }
    }
}
