use assert_cmd::Command;
use std::fs;
use std::time::Instant;
use tempfile::tempdir;

#[test]
fn perf_walk_10k_files_under_5s() {
    // Synthetic repo: 100 directories of 100 files
    let dir = tempdir().unwrap();
    for d in 0..100u32 {
        let sub = dir.path().join(format!("dir{}", d));
        fs::create_dir(&sub).unwrap();
        for i in 0..100u32 {
            fs::write(sub.join(format!("file{}.txt", i)), b"test").unwrap();
        }
    }

    let start = Instant::now();
    Command::cargo_bin("repodoc")
        .unwrap()
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .args(["stats", "--jobs", "4", "--encoding", "heuristic"])
        .assert()
        .success();
    let elapsed = start.elapsed();
    assert!(elapsed.as_secs_f32() < 5.0, "walk took {:?}", elapsed);
}
