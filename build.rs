use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=src");

    println!("cargo:rustc-env=PIXIV_ANALYTICS_GIT_SHA={}", git_sha());

    let mut offenders = Vec::new();
    scan_for_dead_code_allows(Path::new("src"), &mut offenders);
    if !offenders.is_empty() {
        for offender in &offenders {
            eprintln!("  {}", offender);
        }
        panic!(
            "{} #[allow(dead_code)] found under src/; delete the unused code or gate it with #[cfg(test)]",
            offenders.len()
        );
    }
}

/// Short commit hash for `--version`, or `unknown` outside a git checkout.
fn git_sha() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|sha| sha.trim().to_string())
        .filter(|sha| !sha.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn scan_for_dead_code_allows(dir: &Path, offenders: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            scan_for_dead_code_allows(&path, offenders);
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }
        let Ok(source) = std::fs::read_to_string(&path) else {
            continue;
        };
        for (index, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.starts_with("#") && line.contains("allow(") && line.contains("dead_code") {
                offenders.push(format!("{}:{}", path.display(), index + 1));
            }
        }
    }
}
