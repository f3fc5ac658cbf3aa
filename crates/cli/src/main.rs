use std::process;

use clap::Parser;
use proxyconf_admin::{AdminConn, ApplyReport, Error};
use proxyconf_cli::{
    App, ApplyArgs, Command, CommitArgs, ListArgs, PingArgs, RemoveArgs, ShowArgs,
};
use proxyconf_core::{GaleraHostgroup, State};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let app = App::parse();
    let result = match &app.command {
        Command::Apply(args) => apply(args).await,
        Command::Remove(args) => remove(args).await,
        Command::Show(args) => show(args).await,
        Command::List(args) => list(args).await,
        Command::Commit(args) => commit(args).await,
        Command::Ping(args) => ping(args).await,
        Command::Schema => {
            schema();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("proxyconf: {e}");
        process::exit(1);
    }
}

async fn apply(args: &ApplyArgs) -> Result<(), Error> {
    let opts = args.connect.admin_opts()?;
    let desired = args.row.to_row();

    let mut conn = AdminConn::connect(&opts).await?;
    let report =
        proxyconf_admin::apply(&mut conn, State::Present, &desired, &args.mutate.apply_opts())
            .await?;
    conn.close().await?;

    print_report(&report, args.mutate.json);
    Ok(())
}

async fn remove(args: &RemoveArgs) -> Result<(), Error> {
    let opts = args.connect.admin_opts()?;
    // Only the key is meaningful for an absent row.
    let desired = GaleraHostgroup::new(args.writer_hostgroup, 0, 0, 0);

    let mut conn = AdminConn::connect(&opts).await?;
    let report =
        proxyconf_admin::apply(&mut conn, State::Absent, &desired, &args.mutate.apply_opts())
            .await?;
    conn.close().await?;

    print_report(&report, args.mutate.json);
    Ok(())
}

async fn show(args: &ShowArgs) -> Result<(), Error> {
    let opts = args.connect.admin_opts()?;
    let mut conn = AdminConn::connect(&opts).await?;
    let row = conn.fetch_galera_hostgroup(args.writer_hostgroup).await?;
    conn.close().await?;

    let row = row.ok_or(Error::RowMissing {
        writer_hostgroup: args.writer_hostgroup,
    })?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&row).unwrap());
    } else {
        print_row(&row);
    }
    Ok(())
}

async fn list(args: &ListArgs) -> Result<(), Error> {
    let opts = args.connect.admin_opts()?;
    let mut conn = AdminConn::connect(&opts).await?;
    let rows = conn.list_galera_hostgroups().await?;
    conn.close().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows).unwrap());
    } else if rows.is_empty() {
        println!("mysql_galera_hostgroups is empty");
    } else {
        for row in &rows {
            println!(
                "writer {} -> backup {}, reader {}, offline {} (active {}, max_writers {})",
                row.writer_hostgroup,
                row.backup_writer_hostgroup,
                row.reader_hostgroup,
                row.offline_hostgroup,
                u8::from(row.active),
                row.max_writers,
            );
        }
    }
    Ok(())
}

async fn commit(args: &CommitArgs) -> Result<(), Error> {
    let opts = args.connect.admin_opts()?;
    let mut conn = AdminConn::connect(&opts).await?;
    proxyconf_admin::commit(&mut conn, !args.no_save_to_disk, !args.no_load_to_runtime).await?;
    conn.close().await?;

    println!("servers config committed");
    Ok(())
}

async fn ping(args: &PingArgs) -> Result<(), Error> {
    let opts = args.connect.admin_opts()?;
    let mut conn = AdminConn::connect(&opts).await?;
    let version = conn.version().await?;
    conn.close().await?;

    println!("{}:{} is alive ({version})", opts.host, opts.port);
    Ok(())
}

fn schema() {
    let schema = schemars::schema_for!(GaleraHostgroup);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}

fn print_report(report: &ApplyReport, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(report).unwrap());
        return;
    }
    if report.changed {
        println!("changed: {}", report.msg);
    } else {
        println!("unchanged: {}", report.msg);
    }
    for change in &report.changes {
        println!("  {}: {:?} -> {:?}", change.column, change.old, change.new);
    }
}

fn print_row(row: &GaleraHostgroup) {
    println!("writer_hostgroup:        {}", row.writer_hostgroup);
    println!("backup_writer_hostgroup: {}", row.backup_writer_hostgroup);
    println!("reader_hostgroup:        {}", row.reader_hostgroup);
    println!("offline_hostgroup:       {}", row.offline_hostgroup);
    println!("active:                  {}", u8::from(row.active));
    println!("max_writers:             {}", row.max_writers);
    println!(
        "writer_is_also_reader:   {}",
        row.writer_is_also_reader.as_wire()
    );
    println!("max_transactions_behind: {}", row.max_transactions_behind);
    println!("comment:                 {}", row.comment);
}
