//! Integration tests for the runner, splitter, and writer together
//!
//! These tests use real files in temporary directories to exercise
//! end-to-end split scenarios.

#[cfg(test)]
mod tests {
    use crate::error::SplitterError;
    use crate::runner::{run_split, SplitArgs, SplitResult};
    use tempfile::TempDir;
    use tokio::fs;

    // ============ Test Helpers ============

    /// Write an input file with the given content and return its path
    async fn create_input(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("input.txt");
        fs::write(&path, content).await.unwrap();
        path
    }

    /// Run a split with defaults: keyword M30, no blank line, no wrapping
    async fn run_default_split(input: &str, out_dir: &std::path::Path) -> SplitResult {
        let dir = TempDir::new().unwrap();
        let input_path = create_input(&dir, input).await;

        run_split(SplitArgs {
            input: input_path,
            output_dir: out_dir.to_path_buf(),
            keyword: "M30".to_string(),
            append_blank_line: false,
            wrap_percent: false,
            quiet: true,
        })
        .await
        .unwrap()
    }

    async fn read_output(out_dir: &std::path::Path, name: &str) -> String {
        fs::read_to_string(out_dir.join(name)).await.unwrap()
    }

    // ============ Tests ============

    #[tokio::test]
    async fn splits_two_keyword_terminated_programs_into_files() {
        let out = TempDir::new().unwrap();
        let result =
            run_default_split("O100\nG1 X1\nM30\nO200\nG1 Y2\nM30\n", out.path()).await;

        assert_eq!(result.programs_found, 2);
        assert_eq!(result.files_written, 2);
        assert_eq!(result.files_failed, 0);
        assert_eq!(result.lines_processed, 6);
        assert_eq!(
            result.file_names,
            vec!["O100.nc".to_string(), "O200.nc".to_string()]
        );

        assert_eq!(read_output(out.path(), "O100.nc").await, "O100\nG1 X1\nM30\n");
        assert_eq!(read_output(out.path(), "O200.nc").await, "O200\nG1 Y2\nM30\n");
    }

    #[tokio::test]
    async fn blank_line_flag_appends_one_empty_line_per_program() {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let input_path = create_input(&dir, "O100\nG1 X1\nM30\nO200\nG1 Y2\nM30\n").await;

        let result = run_split(SplitArgs {
            input: input_path,
            output_dir: out.path().to_path_buf(),
            keyword: "M30".to_string(),
            append_blank_line: true,
            wrap_percent: false,
            quiet: true,
        })
        .await
        .unwrap();

        assert_eq!(result.files_written, 2);
        assert_eq!(read_output(out.path(), "O100.nc").await, "O100\nG1 X1\nM30\n\n");
        assert_eq!(read_output(out.path(), "O200.nc").await, "O200\nG1 Y2\nM30\n\n");
    }

    #[tokio::test]
    async fn repeated_program_number_overwrites_and_counts_both_writes() {
        let out = TempDir::new().unwrap();
        let result = run_default_split("O005\nG1\nM30\nO005\nG2\nM30\n", out.path()).await;

        assert_eq!(result.programs_found, 2);
        assert_eq!(result.files_written, 2);
        assert_eq!(result.files_failed, 0);

        // Last writer wins on the shared name
        assert_eq!(read_output(out.path(), "O005.nc").await, "O005\nG2\nM30\n");
    }

    #[tokio::test]
    async fn header_before_keyword_closes_previous_program_early() {
        let out = TempDir::new().unwrap();
        let result = run_default_split("O7\nG1\nO8\nG2\nM30\n", out.path()).await;

        assert_eq!(result.programs_found, 2);
        assert_eq!(read_output(out.path(), "O7.nc").await, "O7\nG1\n");
        assert_eq!(read_output(out.path(), "O8.nc").await, "O8\nG2\nM30\n");
    }

    #[tokio::test]
    async fn unwritable_output_directory_is_fatal_with_zero_writes() {
        let dir = TempDir::new().unwrap();
        let input_path = create_input(&dir, "O1\nM30\n").await;

        // Squat a file on the destination path so create_dir_all fails
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, b"in the way").await.unwrap();

        let err = run_split(SplitArgs {
            input: input_path,
            output_dir: blocked.clone(),
            keyword: "M30".to_string(),
            append_blank_line: false,
            wrap_percent: false,
            quiet: true,
        })
        .await
        .unwrap_err();

        match err.downcast_ref::<SplitterError>() {
            Some(SplitterError::OutputDirectoryUnwritable { path, .. }) => {
                assert_eq!(path, &blocked);
            }
            other => panic!("expected OutputDirectoryUnwritable, got {:?}", other),
        }
        // Destination is still a plain file, so nothing was written
        assert!(blocked.is_file());
    }

    #[tokio::test]
    async fn missing_input_file_is_fatal_before_any_output() {
        let out = TempDir::new().unwrap();
        let err = run_split(SplitArgs {
            input: out.path().join("does_not_exist.txt"),
            output_dir: out.path().join("programs"),
            keyword: "M30".to_string(),
            append_blank_line: false,
            wrap_percent: false,
            quiet: true,
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SplitterError>(),
            Some(SplitterError::InputUnavailable { .. })
        ));
        assert!(!out.path().join("programs").exists());
    }

    #[tokio::test]
    async fn input_with_no_headers_produces_no_files() {
        let out = TempDir::new().unwrap();
        let programs_dir = out.path().join("programs");
        let result = run_default_split("G1 X1\nG1 Y2\nM30\n", &programs_dir).await;

        assert_eq!(result.programs_found, 0);
        assert_eq!(result.files_written, 0);
        let mut entries = fs::read_dir(&programs_dir).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn program_ending_at_eof_without_keyword_is_still_written() {
        let out = TempDir::new().unwrap();
        let result = run_default_split("O100\nG1 X1\nM30\nO200\nG1 Y2\n", out.path()).await;

        assert_eq!(result.programs_found, 2);
        assert_eq!(read_output(out.path(), "O200.nc").await, "O200\nG1 Y2\n");
    }

    #[tokio::test]
    async fn percent_wrapping_frames_each_output_file() {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let input_path = create_input(&dir, "O1\nG1\nM30\nO2\nG2\nM30\n").await;

        let result = run_split(SplitArgs {
            input: input_path,
            output_dir: out.path().to_path_buf(),
            keyword: "M30".to_string(),
            append_blank_line: false,
            wrap_percent: true,
            quiet: true,
        })
        .await
        .unwrap();

        assert_eq!(result.files_written, 2);
        assert_eq!(read_output(out.path(), "O1.nc").await, "%\nO1\nG1\nM30\n%\n");
        assert_eq!(read_output(out.path(), "O2.nc").await, "%\nO2\nG2\nM30\n%\n");
    }

    #[tokio::test]
    async fn custom_keyword_is_honored() {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let input_path = create_input(&dir, "O1\nG1\nEND\nO2\nG2\nM30\nEND\n").await;

        let result = run_split(SplitArgs {
            input: input_path,
            output_dir: out.path().to_path_buf(),
            keyword: "END".to_string(),
            append_blank_line: false,
            wrap_percent: false,
            quiet: true,
        })
        .await
        .unwrap();

        assert_eq!(result.programs_found, 2);
        assert_eq!(read_output(out.path(), "O1.nc").await, "O1\nG1\nEND\n");
        // M30 is just content when the keyword is END
        assert_eq!(read_output(out.path(), "O2.nc").await, "O2\nG2\nM30\nEND\n");
    }

    #[tokio::test]
    async fn leading_zero_numbers_produce_distinct_files() {
        let out = TempDir::new().unwrap();
        let result = run_default_split("O7\nG1\nM30\nO007\nG2\nM30\n", out.path()).await;

        assert_eq!(result.files_written, 2);
        assert!(out.path().join("O7.nc").exists());
        assert!(out.path().join("O007.nc").exists());
    }

    #[tokio::test]
    async fn large_program_count_completes_with_full_summary() {
        let out = TempDir::new().unwrap();
        let mut input = String::new();
        for i in 1..=250 {
            input.push_str(&format!("O{}\nG1 X{}\nM30\n", i, i));
        }

        let result = run_default_split(&input, out.path()).await;

        assert_eq!(result.programs_found, 250);
        assert_eq!(result.files_written, 250);
        assert_eq!(result.files_failed, 0);
        assert_eq!(result.file_names.len(), 250);
        assert_eq!(result.lines_processed, 750);
        assert!(out.path().join("O1.nc").exists());
        assert!(out.path().join("O250.nc").exists());
    }

    #[tokio::test]
    async fn rerunning_the_same_split_yields_identical_outputs() {
        let input = "O10\nG1\nM30\nO20\nG2\nM30\n";

        let out_a = TempDir::new().unwrap();
        let first = run_default_split(input, out_a.path()).await;
        let out_b = TempDir::new().unwrap();
        let second = run_default_split(input, out_b.path()).await;

        assert_eq!(first.file_names, second.file_names);
        assert_eq!(
            read_output(out_a.path(), "O10.nc").await,
            read_output(out_b.path(), "O10.nc").await
        );
        assert_eq!(
            read_output(out_a.path(), "O20.nc").await,
            read_output(out_b.path(), "O20.nc").await
        );
    }
}
