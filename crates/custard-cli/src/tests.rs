use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["custard-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["custard-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["custard-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn signals_requires_store() {
    assert!(Cli::try_parse_from(["custard-cli", "signals"]).is_err());
}

#[test]
fn parses_signals_with_limit_and_today() {
    let cli = Cli::try_parse_from([
        "custard-cli",
        "signals",
        "--store",
        "mt-horeb",
        "--limit",
        "5",
        "--today",
        "2026-02-20",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Signals {
            store,
            limit,
            today,
            json,
        }) => {
            assert_eq!(store, "mt-horeb");
            assert_eq!(limit, Some(5));
            assert_eq!(today, NaiveDate::from_ymd_opt(2026, 2, 20));
            assert!(!json);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn rejects_malformed_today() {
    let result = Cli::try_parse_from([
        "custard-cli",
        "signals",
        "--store",
        "mt-horeb",
        "--today",
        "02/20/2026",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_geo_with_region() {
    let cli = Cli::try_parse_from([
        "custard-cli",
        "geo",
        "--scope",
        "state",
        "--region",
        "WI",
        "--json",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Geo {
            ref scope,
            region: Some(ref region),
            today: None,
            json: true,
        }) if scope == "state" && region == "WI"
    ));
}

#[test]
fn parses_summary_command() {
    let cli = Cli::try_parse_from(["custard-cli", "summary", "--store", "mt-horeb"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Summary { ref store, .. }) if store == "mt-horeb"
    ));
}
