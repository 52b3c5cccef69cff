//! Command-line tests
//!
//! Run the compiled binary and check exit codes and files it produces.

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::process::{Command, Stdio};
    use tempfile::TempDir;

    fn bank_server() -> Command {
        Command::new(env!("CARGO_BIN_EXE_bank-server"))
    }

    #[test]
    fn test_reads_stdin_and_writes_results() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("results.txt");

        let mut child = bank_server()
            .args(["2", "2"])
            .arg(&output)
            .args(["--initial-balance", "100"])
            .stdin(Stdio::piped())
            .spawn()
            .expect("Failed to start bank-server");
        child
            .stdin
            .take()
            .unwrap()
            .write_all(b"TRANS 1 -40 2 40\nEND\n")
            .unwrap();
        let status = child.wait().unwrap();

        assert!(status.success());
        let results = fs::read_to_string(&output).unwrap();
        assert!(results.starts_with("1 OK TIME "), "got: {}", results);
        assert_eq!(results.lines().count(), 1);
    }

    #[test]
    fn test_writes_final_balances() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("commands.txt");
        let output = dir.path().join("results.txt");
        let balances = dir.path().join("balances.csv");
        fs::write(&input, "TRANS 1 -40 2 40\nTRANS 1 -100 3 100\nEND\n").unwrap();

        let status = bank_server()
            .args(["4", "3"])
            .arg(&output)
            .arg("--input")
            .arg(&input)
            .args(["--initial-balance", "100"])
            .arg("--balances")
            .arg(&balances)
            .status()
            .unwrap();

        assert!(status.success());
        assert_eq!(
            fs::read_to_string(&balances).unwrap(),
            "account,balance\n1,60\n2,140\n3,100\n"
        );
    }

    #[rstest]
    #[case::no_arguments(&[])]
    #[case::missing_output(&["2", "2"])]
    #[case::zero_workers(&["0", "2", "unused.txt"])]
    #[case::zero_accounts(&["2", "0", "unused.txt"])]
    #[case::non_numeric(&["two", "2", "unused.txt"])]
    #[case::negative_initial_balance(&["2", "2", "unused.txt", "--initial-balance", "-1"])]
    #[case::too_many_workers(&["1000000", "2", "unused.txt"])]
    #[case::too_many_accounts(&["1", "4000000000", "unused.txt"])]
    fn test_invalid_configuration_exit_code(#[case] args: &[&str]) {
        let dir = TempDir::new().unwrap();

        let status = bank_server()
            .current_dir(dir.path())
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();

        assert_eq!(status.code(), Some(255));
        assert!(!dir.path().join("unused.txt").exists());
    }

    #[test]
    fn test_missing_input_file_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();

        let status = bank_server()
            .args(["1", "1"])
            .arg(dir.path().join("results.txt"))
            .arg("--input")
            .arg(dir.path().join("missing.txt"))
            .stderr(Stdio::null())
            .status()
            .unwrap();

        assert_eq!(status.code(), Some(255));
    }

    #[test]
    fn test_unopenable_output_exit_code() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("no_such_dir").join("results.txt");

        let status = bank_server()
            .args(["1", "1"])
            .arg(&output)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();

        assert_eq!(status.code(), Some(254));
    }

    #[test]
    fn test_help_exits_successfully() {
        let status = bank_server()
            .arg("--help")
            .stdout(Stdio::null())
            .status()
            .unwrap();
        assert!(status.success());
    }
}
