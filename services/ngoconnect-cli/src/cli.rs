//! Command-line arguments

use api::ApplicationStatus;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ngoconnect")]
#[command(about = "NGOConnect command-line client", version)]
pub struct Cli {
    /// Config file (overrides CONFIG_PATH)
    #[arg(long, global = true)]
    pub config: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NGOCONNECT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in profile
    Whoami,
    Campaigns,
    Events,
    Tasks {
        /// Only tasks assigned to me
        #[arg(long)]
        mine: bool,
    },
    Notifications {
        #[arg(long)]
        mark_all_read: bool,
    },
    /// Volunteer applications (admin)
    Volunteers {
        /// pending, approved or rejected
        #[arg(long, value_parser = parse_status)]
        status: Option<ApplicationStatus>,
    },
    Dashboard,
    /// My own donations
    MyDonations,
    /// Start a guest donation and print the payment URL
    Donate {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        campaign: Option<u64>,
    },
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, String> {
    match raw.to_ascii_uppercase().as_str() {
        "PENDING" => Ok(ApplicationStatus::Pending),
        "APPROVED" => Ok(ApplicationStatus::Approved),
        "REJECTED" => Ok(ApplicationStatus::Rejected),
        other => Err(format!("unknown application status: {other}")),
    }
}
