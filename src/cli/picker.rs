//! Interactive raw-CSV picker.
//!
//! Used by `wdi build` / `wdi validate` when neither `-f` nor `WDI_RAW_CSV`
//! names an input. Searches for `*.csv` files under the current working
//! directory, skipping the tables this tool writes itself.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::io::tables::{CLEANED_FILE, MAIN_DATA_FILE, SNAPSHOT_FILE, WORLD_FILE};

/// Directory recursion depth when searching for candidates.
const SEARCH_DEPTH: usize = 4;

/// Prompt on stdin/stdout for a raw WDI export found under the current directory.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let candidates = discover_csv_files();
    if candidates.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv files found. Provide one with `wdi build -f <file.csv>` or set WDI_RAW_CSV.",
        ));
    }
    let stdin = io::stdin();
    pick(&candidates, &mut stdin.lock(), &mut io::stdout())
}

/// Selection loop: a list number or an explicit path; `q` cancels.
fn pick(
    candidates: &[PathBuf],
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<PathBuf, AppError> {
    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(out, "Raw CSV candidates ({}):", candidates.len()).map_err(write_err)?;
    for (n, path) in candidates.iter().enumerate() {
        writeln!(out, "{:>3}) {}", n + 1, display_path(path)).map_err(write_err)?;
    }

    loop {
        write!(out, "File number (1-{}), a path, or q: ", candidates.len()).map_err(write_err)?;
        out.flush().map_err(write_err)?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if read == 0 {
            return Err(AppError::new(
                2,
                "No input received. Pass the raw CSV with `wdi build -f <file.csv>`.",
            ));
        }

        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        let chosen = match answer.parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => validate_csv_path(&candidates[n - 1]),
            Ok(n) => {
                writeln!(out, "No entry {n}.").map_err(write_err)?;
                continue;
            }
            Err(_) => validate_csv_path(Path::new(answer)),
        };
        match chosen {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(out, "{err}").map_err(write_err)?,
        }
    }
}

/// Check that `path` is an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if !path.is_file() {
        return Err(AppError::new(2, format!("Expected a file, got: {}", path.display())));
    }
    if !is_csv(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {}).", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Candidate raw CSVs under the current directory, sorted by path.
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), SEARCH_DEPTH)
}

fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![(root.to_path_buf(), 0usize)];

    while let Some((dir, depth)) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(kind) = entry.file_type() else {
                continue;
            };
            if kind.is_dir() {
                if depth < max_depth && !is_ignored_dir(&path) {
                    pending.push((path, depth + 1));
                }
            } else if kind.is_file() && is_csv(&path) && !is_generated_table(&path) {
                found.push(path);
            }
        }
    }

    found.sort_by_key(|p| display_path(p));
    found
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Files written by `wdi build`; never offered as raw input.
fn is_generated_table(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    [MAIN_DATA_FILE, SNAPSHOT_FILE, WORLD_FILE, CLEANED_FILE].contains(&name)
}

fn is_ignored_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.starts_with('.') || matches!(name, "target" | "node_modules")
}

fn display_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}
