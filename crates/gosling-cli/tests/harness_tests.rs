//! Regression harness tests against a scripted backend.

#![cfg(unix)]

use gosling_cli::cli::{HarnessConfig, PipelineConfig, ToolchainConfig};
use gosling_cli::harness::TestHarness;
use gosling_cli::toolchain::{Platform, ToolchainHandle};
use std::path::Path;
use tempfile::TempDir;

/// Fake C++ compiler: ignores its inputs and installs a backend script that
/// accepts any program not containing `NOPE`, always exiting 0. The exit
/// code never reflects the verdict, exactly like the real backend.
const FAKE_CC: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
    case "$1" in
        -o) out="$2"; shift 2 ;;
        *) shift ;;
    esac
done
cat > "$out" <<'EOF'
#!/bin/sh
if grep -q NOPE "$1" >/dev/null 2>&1; then
    echo "FRONTEND REJECT"
else
    echo "FRONTEND OK"
fi
exit 0
EOF
chmod +x "$out"
exit 0
"#;

fn write_script(path: &Path, content: &str) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::write(path, content).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

struct Fixture {
    _temp: TempDir,
    toolchain: ToolchainConfig,
    pipeline: PipelineConfig,
    harness: HarnessConfig,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    let backend_dir = root.join("backend");
    let tests_dir = root.join("tests");
    std::fs::create_dir_all(&backend_dir).unwrap();
    std::fs::create_dir_all(&tests_dir).unwrap();

    let cc = root.join("fake-cc.sh");
    write_script(&cc, FAKE_CC);

    let toolchain = ToolchainConfig {
        source_dir: backend_dir,
        exe_name: "fake-backend".to_string(),
        compiler: cc.display().to_string(),
        compiler_flags: Vec::new(),
        sources: vec!["main.cpp".to_string()],
        container_marker: root.join("no-such-marker"),
        container_source_dir: root.join("backend"),
        build_timeout_secs: 30,
    };
    let pipeline = PipelineConfig {
        source_ext: "go".to_string(),
        assembler: "gcc".to_string(),
        assembler_flags: vec!["-no-pie".to_string()],
        output_dir: root.join("outputs"),
        tests_dir,
    };
    let harness = HarnessConfig {
        test_pattern: "test*.go".to_string(),
        success_marker: "FRONTEND OK".to_string(),
        failure_marker: "FRONTEND REJECT".to_string(),
        test_timeout_secs: 10,
        max_failure_details: 5,
        stderr_excerpt_len: 200,
    };

    Fixture {
        _temp: temp,
        toolchain,
        pipeline,
        harness,
    }
}

#[tokio::test]
async fn test_suite_rebuilds_and_classifies_by_markers() {
    let fx = fixture();
    std::fs::write(fx.pipeline.tests_dir.join("test1.go"), "package main\n").unwrap();
    std::fs::write(fx.pipeline.tests_dir.join("test2.go"), "NOPE\n").unwrap();
    std::fs::write(fx.pipeline.tests_dir.join("test3.go"), "package main\n").unwrap();

    let harness = TestHarness::new(fx.toolchain, fx.pipeline, fx.harness);
    let report = harness.run_suite().await.unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.passed, vec!["test1.go", "test3.go"]);
    assert_eq!(report.failed.len(), 1);
    // The backend exited 0 here; the marker text alone decides the verdict.
    assert_eq!(report.failed[0].name, "test2.go");
    assert!(report.failed[0].output.contains("FRONTEND REJECT"));
}

#[tokio::test]
async fn test_suite_aborts_when_build_fails() {
    let fx = fixture();
    std::fs::write(fx.pipeline.tests_dir.join("test1.go"), "package main\n").unwrap();

    let mut toolchain = fx.toolchain;
    toolchain.compiler = "/nonexistent/never-a-compiler".to_string();

    let harness = TestHarness::new(toolchain, fx.pipeline, fx.harness);
    let err = harness.run_suite().await.unwrap_err();
    assert!(matches!(err, gosling_cli::CliError::Toolchain(_)));
}

#[tokio::test]
async fn test_check_file_timeout_is_a_failure_verdict() {
    let fx = fixture();

    let slow = fx.toolchain.source_dir.join("slow-backend");
    write_script(&slow, "#!/bin/sh\nsleep 10\n");

    let mut config = fx.harness;
    config.test_timeout_secs = 1;

    let test_file = fx.pipeline.tests_dir.join("test1.go");
    std::fs::write(&test_file, "package main\n").unwrap();

    let harness = TestHarness::new(fx.toolchain, fx.pipeline, config);
    let handle = ToolchainHandle {
        path: slow,
        platform: Platform::current(),
        executable: true,
    };

    let result = harness.check_file(&handle, &test_file).await;
    assert!(!result.passed);
    assert_eq!(result.stderr, "Timeout");
    assert_eq!(result.exit_code, None);
}

#[tokio::test]
async fn test_run_single_appends_extension() {
    let fx = fixture();
    std::fs::write(
        fx.pipeline.tests_dir.join("test7.go"),
        "package main\n",
    )
    .unwrap();

    // Pre-place the backend so resolution finds it without a rebuild.
    let exe = fx.toolchain.source_dir.join("fake-backend");
    write_script(
        &exe,
        "#!/bin/sh\necho \"FRONTEND OK\"\nexit 0\n",
    );

    let harness = TestHarness::new(fx.toolchain, fx.pipeline, fx.harness);

    let (source, result) = harness.run_single("test7").await.unwrap();
    assert!(source.contains("package main"));
    assert!(result.passed);

    let (_, result_with_ext) = harness.run_single("test7.go").await.unwrap();
    assert!(result_with_ext.passed);
}

#[tokio::test]
async fn test_run_single_unknown_test_fails() {
    let fx = fixture();
    let harness = TestHarness::new(fx.toolchain, fx.pipeline, fx.harness);
    let err = harness.run_single("test99").await.unwrap_err();
    assert!(matches!(err, gosling_cli::CliError::InvalidInput(_)));
}

#[tokio::test]
async fn test_list_tests_sorts_lexically() {
    let fx = fixture();
    std::fs::write(fx.pipeline.tests_dir.join("test10.go"), "").unwrap();
    std::fs::write(fx.pipeline.tests_dir.join("test2.go"), "").unwrap();
    std::fs::write(fx.pipeline.tests_dir.join("notes.txt"), "").unwrap();

    let harness = TestHarness::new(fx.toolchain, fx.pipeline, fx.harness);
    let names = harness.list_tests().unwrap();

    // Harness discovery is lexical, unlike the batch driver's numeric order.
    assert_eq!(names, vec!["test10.go", "test2.go"]);
}
