//! End-to-end tests of the drill pipeline on a real filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use drill_runner::{
    CachedRunner, DrillError, Invocation, Origin, ProcessOutput, ProcessRunner, Toolchain,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const DOUBLE: &str = "package drill\n\
                      func double(i int) int { return 2 * i }\n\
                      func init(){ println(double(2)) }\n";

/// Pretends to be `go run`: records the staged program and prints 4.
#[derive(Default)]
struct GoRun {
    calls: AtomicUsize,
    staged: Mutex<Option<String>>,
}

impl ProcessRunner for GoRun {
    fn run(&self, invocation: &Invocation) -> ProcessOutput {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let staged = invocation.working_dir.join(&invocation.args[1]);
        *self.staged.lock().unwrap() = fs::read_to_string(staged).ok();
        ProcessOutput {
            combined: b"4\n".to_vec(),
            failure: None,
        }
    }
}

struct Site {
    _tmp: TempDir,
    entry: PathBuf,
    build: PathBuf,
}

fn site_with_drill(name: &str, contents: &str) -> Site {
    let tmp = TempDir::new().unwrap();
    let drills = tmp.path().join("drill");
    fs::create_dir_all(&drills).unwrap();
    let entry = drills.join(name);
    fs::write(&entry, contents).unwrap();
    set_mtime(&entry, SystemTime::now() - Duration::from_secs(3600));
    Site {
        build: tmp.path().join("build"),
        entry,
        _tmp: tmp,
    }
}

fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn runner(site: &Site, process: &Arc<GoRun>) -> CachedRunner {
    CachedRunner::new(&site.build, Toolchain::default())
        .with_process_runner(Arc::clone(process) as Arc<dyn ProcessRunner>)
}

#[test]
fn double_drill_end_to_end() {
    let site = site_with_drill("double.go", DOUBLE);
    let process = Arc::new(GoRun::default());

    let captured = runner(&site, &process).run_cached("", &[&site.entry]).unwrap();

    let staged = process.staged.lock().unwrap().clone().unwrap();
    assert!(staged.contains("package main"));
    assert!(staged.contains("func main("));

    let cached = fs::read_to_string(site.build.join("double/output.txt")).unwrap();
    assert!(cached.starts_with("$ "));
    assert_eq!(cached.lines().next(), Some("$ go run double.go"));
    assert!(String::from_utf8_lossy(&captured.bytes).contains('4'));
    assert_eq!(captured.bytes, cached.into_bytes());

    // Staged copy is gone, output stays
    assert!(!site.build.join("double/double.go").exists());
}

#[test]
fn unchanged_source_is_served_from_cache() {
    let site = site_with_drill("double.go", DOUBLE);
    let process = Arc::new(GoRun::default());
    let runner = runner(&site, &process);

    let first = runner.run_cached("", &[&site.entry]).unwrap();
    let second = runner.run_cached("", &[&site.entry]).unwrap();

    assert_eq!(first.origin, Origin::Fresh);
    assert_eq!(second.origin, Origin::Cache);
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(process.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn touched_source_is_rebuilt() {
    let site = site_with_drill("double.go", DOUBLE);
    let process = Arc::new(GoRun::default());
    let runner = runner(&site, &process);

    runner.run_cached("", &[&site.entry]).unwrap();
    runner.run_cached("", &[&site.entry]).unwrap();
    assert_eq!(process.calls.load(Ordering::SeqCst), 1);

    set_mtime(&site.entry, SystemTime::now() + Duration::from_secs(60));
    let captured = runner.run_cached("", &[&site.entry]).unwrap();

    assert_eq!(captured.origin, Origin::Fresh);
    assert_eq!(process.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn missing_source_leaves_cache_untouched() {
    let site = site_with_drill("double.go", DOUBLE);
    let process = Arc::new(GoRun::default());
    let ghost = site.entry.with_file_name("ghost.go");

    let err = runner(&site, &process).run_cached("", &[&ghost]).unwrap_err();

    assert!(matches!(err, DrillError::Read { .. }), "got {err:?}");
    assert!(!site.build.join("ghost/output.txt").exists());
    assert_eq!(process.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn failed_source_read_keeps_previous_cache() {
    let site = site_with_drill("double.go", DOUBLE);
    let process = Arc::new(GoRun::default());
    let runner = runner(&site, &process);
    runner.run_cached("", &[&site.entry]).unwrap();
    let before = fs::read(site.build.join("double/output.txt")).unwrap();

    fs::remove_file(&site.entry).unwrap();
    let err = runner.run_cached("", &[&site.entry]).unwrap_err();

    assert!(matches!(err, DrillError::Read { .. }), "got {err:?}");
    assert_eq!(fs::read(site.build.join("double/output.txt")).unwrap(), before);
}

#[test]
fn companion_files_share_the_entry_directory() {
    let site = site_with_drill("serve.go", DOUBLE);
    fs::write(site.entry.with_file_name("serve.test.go"), "package drill\n").unwrap();
    let process = Arc::new(GoRun::default());

    let files = [site.entry.clone(), site.entry.with_file_name("serve.test.go")];
    runner(&site, &process).run_cached("", &files).unwrap();

    assert!(site.build.join("serve/output.txt").exists());
    assert_eq!(fs::read_dir(&site.build).unwrap().count(), 1);
}

#[cfg(unix)]
#[test]
fn shell_toolchain_runs_for_real() {
    let site = site_with_drill("greet.sh", "echo hello \"$1\"\necho oops >&2\nexit 1\n");
    let toolchain = Toolchain {
        program: "/bin/sh".to_owned(),
        run_args: Vec::new(),
        elide_prefix: Some("/bin/".to_owned()),
    };
    let runner = CachedRunner::new(&site.build, toolchain);

    let captured = runner.run_cached("world", &[&site.entry]).unwrap();

    assert_eq!(
        String::from_utf8(captured.bytes).unwrap(),
        "$ sh greet.sh world\nhello world\noops\n"
    );
    assert!(captured.failure.is_some());
    assert!(!site.build.join("greet/greet.sh").exists());
}
