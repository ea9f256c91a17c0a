use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use sealnote_core::VERSION;

/// Sealnote - encrypted local notes with passphrase and second-device unlock
#[derive(Parser)]
#[command(name = "sealnote")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the note store
    #[arg(short, long, global = true, env = "SEALNOTE_STORE")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new store and master key
    Init(InitArgs),

    /// Add a note
    Add(AddArgs),

    /// Replace the text of a note
    Edit(EditArgs),

    /// Show a note
    Show(ShowArgs),

    /// List notes, newest first
    List(ListArgs),

    /// Delete a note
    Delete(DeleteArgs),

    /// Change the passphrase
    Passwd(PasswdArgs),

    /// Write an encrypted backup file
    Export(ExportArgs),

    /// Restore notes from a backup file
    Import(ImportArgs),

    /// Manage unlock credentials registered with this store
    #[command(subcommand)]
    Credential(CredentialCommand),

    /// Authenticate through a second device via the relay
    UnlockRemote(UnlockRemoteArgs),

    /// Manage this device's signing key for answering unlock requests
    #[command(subcommand)]
    Authenticator(AuthenticatorCommand),

    /// Answer an unlock request from another device
    Respond(RespondArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the store will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// PBKDF2 iterations for the passphrase
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Note text (otherwise read from stdin)
    #[arg(long)]
    pub text: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Note ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// New note text (otherwise read from stdin)
    #[arg(long)]
    pub text: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Note ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Note ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip confirmation
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `passwd` command
#[derive(Args)]
pub struct PasswdArgs {
    /// Disable interactive prompts (reads SEALNOTE_NEW_PASSPHRASE)
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `export` command
#[derive(Args)]
pub struct ExportArgs {
    /// Destination file
    #[arg(value_name = "DEST")]
    pub destination: String,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `import` command
#[derive(Args)]
pub struct ImportArgs {
    /// Backup file to read
    #[arg(value_name = "SOURCE")]
    pub source: String,
}

#[derive(Subcommand)]
pub enum CredentialCommand {
    /// Issue a registration challenge for a new credential
    Challenge,

    /// Register a credential from a registration response file ("-" for stdin)
    Register {
        #[arg(value_name = "RESPONSE")]
        response: String,
    },

    /// List registered credentials
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a registered credential
    Remove {
        /// Credential ID (base64url)
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// Arguments for the `unlock-remote` command
#[derive(Args)]
pub struct UnlockRemoteArgs {
    /// Relay base URL (overrides config)
    #[arg(long)]
    pub relay: Option<String>,

    /// Give up after this many seconds (at most the session lifetime)
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,
}

#[derive(Subcommand)]
pub enum AuthenticatorCommand {
    /// Create this device's signing key
    Init {
        /// Replace an existing key
        #[arg(long)]
        force: bool,
    },

    /// Answer a registration challenge, printing the response JSON
    Register {
        #[arg(value_name = "CHALLENGE")]
        challenge: String,
    },

    /// Show the credential ID and signature counter
    Show,
}

/// Arguments for the `respond` command
#[derive(Args)]
pub struct RespondArgs {
    /// Unlock link (sealnote://unlock?...)
    #[arg(value_name = "URI")]
    pub uri: String,
}
