use std::error::Error;
use std::io::Write;
use std::path::Path;

use auctioneer::config::{Settings, load_and_validate, load_from_reader};
use auctioneer::errors::AuctionError;
use auctioneer_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn write_input(contents: &str) -> Result<tempfile::NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn file_input_resolves_bidders_against_bidder_dir() -> TestResult {
    init_tracing();

    let file = write_input("100 10 3\nalpha 0\nbeta 2 --fast 7\ngamma 1 x\n")?;
    let config = load_and_validate(file.path(), Path::new("/opt/bidders"))?;

    assert_eq!(config.starting_bid, 100);
    assert_eq!(config.min_increment, 10);
    assert_eq!(config.bidder_count(), 3);

    let beta = config.bidder(1).ok_or("missing bidder 1")?;
    assert_eq!(beta.name, "beta");
    assert_eq!(beta.executable_path, Path::new("/opt/bidders/beta"));
    assert_eq!(beta.arguments, vec!["--fast", "7"]);

    let ids: Vec<_> = config.bidders.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn reader_input_accepts_arbitrary_whitespace() -> TestResult {
    init_tracing();

    let input = "  5\t1\n\n1   solo\n0  ";
    let config = load_from_reader(input.as_bytes(), &Settings::default().bidder_dir)?;

    assert_eq!(config.bidder_count(), 1);
    assert_eq!(config.bidders[0].executable_path, Path::new("../bin/solo"));
    Ok(())
}

#[test]
fn malformed_inputs_are_rejected_before_anything_runs() -> TestResult {
    init_tracing();

    let cases = [
        ("", "empty input"),
        ("100 10", "missing bidder count"),
        ("100 ten 1 a 0", "non-numeric increment"),
        ("100 10 0", "zero bidders"),
        ("100 10 2 a 0", "second bidder missing"),
        ("100 10 1 a 3 x y", "too few arguments"),
        ("100 10 1 a -1", "negative argument count"),
        ("100 10 1 a 0 surplus", "trailing token"),
        ("-5 10 1 a 0", "negative starting bid"),
        ("100 0 1 a 0", "zero increment"),
    ];

    for (input, label) in cases {
        let file = write_input(input)?;
        let err = load_and_validate(file.path(), Path::new("bin"))
            .err()
            .ok_or_else(|| format!("{label}: expected an error"))?;
        assert!(
            matches!(err, AuctionError::MalformedInput(_)),
            "{label}: expected MalformedInput, got {err:?}"
        );
    }
    Ok(())
}

#[test]
fn missing_input_file_is_an_io_error() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let err = load_and_validate(dir.path().join("absent.txt"), Path::new("bin")).unwrap_err();
    assert!(matches!(err, AuctionError::Io(_)));
}

#[test]
fn settings_file_overrides_defaults() -> TestResult {
    init_tracing();

    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[auction]
bidder_dir = "/srv/bidders"
read_timeout = "250ms"
max_rounds = 4

[protocol]
pass_token = "Skip"
"#
    )?;

    let settings = Settings::load(file.path())?;
    assert_eq!(settings.bidder_dir, Path::new("/srv/bidders"));
    assert_eq!(settings.read_timeout.as_millis(), 250);
    assert_eq!(settings.max_rounds, Some(4));
    assert_eq!(settings.tokens.pass, "skip");
    assert_eq!(settings.tokens.withdraw, "withdraw");
    Ok(())
}
