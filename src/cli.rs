use clap::{Parser, Subcommand};

/// Pitchivo — tiered share-link access control for supplier product pages
#[derive(Parser)]
#[command(name = "pitchivo", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to bind (defaults to PITCHIVO_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage share links
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },

    /// Manage supplier organizations and merchant keys
    Org {
        #[command(subcommand)]
        command: OrgCommands,
    },
}

#[derive(Subcommand)]
pub enum OrgCommands {
    /// Create an organization
    Create {
        #[arg(long)]
        name: String,
    },
    /// Issue a merchant API key for an org (prints the key once)
    IssueKey {
        #[arg(long)]
        org_id: String,
    },
}

#[derive(Subcommand)]
pub enum LinkCommands {
    /// Issue a share link (prints the one-time secret URL)
    Create {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        org_id: String,
        #[arg(long)]
        channel_id: String,
        #[arg(long)]
        channel_name: String,
        /// public, after_click or after_rfq
        #[arg(long, default_value = "after_click")]
        access_level: String,
        #[arg(long)]
        expires_in_days: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List links for a product
    List {
        #[arg(long)]
        product_id: String,
    },
    /// Revoke a link
    Revoke {
        #[arg(long)]
        token_id: String,
    },
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_without_port_flag_leaves_port_unset() {
        let cli = Cli::parse_from(["pitchivo", "serve"]);
        match cli.command {
            Some(Commands::Serve { port }) => assert_eq!(port, None),
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_serve_port_flag_overrides() {
        let cli = Cli::parse_from(["pitchivo", "serve", "--port", "9090"]);
        match cli.command {
            Some(Commands::Serve { port }) => assert_eq!(port, Some(9090)),
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_org_commands_parse() {
        let cli = Cli::parse_from(["pitchivo", "org", "create", "--name", "Acme Ingredients"]);
        match cli.command {
            Some(Commands::Org {
                command: OrgCommands::Create { name },
            }) => assert_eq!(name, "Acme Ingredients"),
            _ => panic!("expected org create"),
        }

        let cli = Cli::parse_from([
            "pitchivo",
            "org",
            "issue-key",
            "--org-id",
            "00000000-0000-0000-0000-000000000001",
        ]);
        assert!(matches!(
            cli.command,
            Some(Commands::Org {
                command: OrgCommands::IssueKey { .. }
            })
        ));
    }
}
