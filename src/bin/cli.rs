//! LedgerDB CLI Client
//!
//! Command-line interface for interacting with a LedgerDB server.

use clap::{Parser, Subcommand};
use ledgerdb::network::Client;
use ledgerdb::protocol::{Command, Reply, Status};

/// LedgerDB CLI
#[derive(Parser, Debug)]
#[command(name = "ledgerdb-cli")]
#[command(about = "CLI for the LedgerDB table store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a table; columns are declarations like "amount int"
    Create {
        /// Table name
        table: String,

        /// Column declarations, first one names the key
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// List tables
    Tables,

    /// Show a table's columns
    Describe {
        table: String,
    },

    /// Insert a row: key, then the remaining column values
    Insert {
        table: String,

        /// Primary key
        key: String,

        /// Values for the non-key columns, in order
        values: Vec<String>,
    },

    /// Fetch rows: all, by key, or by column value
    Select {
        table: String,

        /// Fetch a single row by key
        #[arg(long, conflicts_with = "column")]
        id: Option<String>,

        /// Filter by column (requires --value)
        #[arg(long, requires = "value")]
        column: Option<String>,

        /// Value the column must equal (case-insensitive)
        #[arg(long)]
        value: Option<String>,
    },

    /// Update columns of one row: col=value pairs
    Update {
        table: String,
        key: String,

        /// Assignments like merchant=Tea
        #[arg(required = true)]
        set: Vec<String>,
    },

    /// Delete a row by key
    Delete {
        table: String,
        key: String,
    },

    /// Ping the server
    Ping,
}

fn to_command(command: Commands) -> Result<Command, String> {
    let cmd = match command {
        Commands::Create { table, columns } => Command::CreateTable {
            name: table,
            columns,
        },
        Commands::Tables => Command::ListTables,
        Commands::Describe { table } => Command::Describe { table },
        Commands::Insert { table, key, values } => {
            let mut row = Vec::with_capacity(values.len() + 2);
            row.push(key);
            row.push("1".to_string());
            row.extend(values);
            Command::Insert { table, row }
        }
        Commands::Select {
            table,
            id,
            column,
            value,
        } => match (id, column, value) {
            (Some(key), _, _) => Command::SelectById { table, key },
            (None, Some(column), Some(value)) => Command::SelectByColumn {
                table,
                column,
                value,
            },
            _ => Command::SelectAll { table },
        },
        Commands::Update { table, key, set } => {
            let mut updates = Vec::with_capacity(set.len());
            for assignment in set {
                let (col, val) = assignment
                    .split_once('=')
                    .ok_or_else(|| format!("invalid assignment {:?}, expected col=value", assignment))?;
                updates.push((col.trim().to_string(), val.trim().to_string()));
            }
            Command::Update {
                table,
                key,
                updates,
            }
        }
        Commands::Delete { table, key } => Command::Delete { table, key },
        Commands::Ping => Command::Ping,
    };
    Ok(cmd)
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Done => println!("OK"),
        Reply::Pong => println!("PONG"),
        Reply::Tables(names) | Reply::Columns(names) => {
            for name in names {
                println!("{}", name);
            }
        }
        Reply::Row(row) => println!("{}", row.join(" | ")),
        Reply::Rows(rows) => {
            for row in rows {
                println!("{}", row.join(" | "));
            }
            println!("({} row(s))", rows.len());
        }
        Reply::Error(message) => eprintln!("{}", message),
    }
}

fn main() {
    let args = Args::parse();

    let command = match to_command(args.command) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: cannot connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    match client.execute(&command) {
        Ok(response) => {
            print_reply(&response.reply);
            let code = match response.status {
                Status::Ok => 0,
                Status::NotFound => 3,
                Status::ClientError => 4,
                Status::ServerError => 5,
            };
            std::process::exit(code);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
